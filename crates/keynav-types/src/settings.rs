//! User settings read by normal-mode commands.
//!
//! Settings are loaded from a TOML file; every field has a default so an
//! empty file (or no file at all) yields a working configuration.

use std::path::Path;

use serde::Deserialize;

use crate::error::{KeynavError, Result};

/// Named configuration values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Pixels moved by one line scroll (`j`, `k`, `h`, `l`).
    pub scroll_step_size: i32,
    /// Comma-separated phrases that identify a "next page" link.
    pub next_patterns: String,
    /// Comma-separated phrases that identify a "previous page" link.
    pub previous_patterns: String,
    /// Product name used in the repeat-limit confirmation prompt.
    pub product_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scroll_step_size: 60,
            next_patterns: "next,more,newer,>,›,→,»,≫,>>".to_string(),
            previous_patterns: "prev,previous,back,older,<,‹,←,«,≪,<<".to_string(),
            product_name: "keynav".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| KeynavError::Config(format!("settings: {e}")))
    }

    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&text)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Phrases for the "next page" link search, most preferred first.
    pub fn next_phrases(&self) -> Vec<String> {
        split_phrases(&self.next_patterns)
    }

    /// Phrases for the "previous page" link search, most preferred first.
    pub fn previous_phrases(&self) -> Vec<String> {
        split_phrases(&self.previous_patterns)
    }
}

/// Split a comma-separated phrase list, dropping blank entries.
///
/// Entries are trimmed and lowercased so that matching can compare against
/// lowercased page text.
pub fn split_phrases(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}
