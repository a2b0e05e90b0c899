//! Key mappings and key-sequence resolution.
//!
//! Mappings are keyed by key notation (`gg`, `<c-d>`, `[[`). They load from
//! a TOML file for hand-written configuration, or from the JSON form the
//! session store keeps. The [`KeyResolver`] turns a stream of key events
//! into `(descriptor, count)` pairs.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use keynav_types::error::{KeynavError, Result};
use keynav_types::input::{Key, KeyEvent};

use crate::command::{CommandDescriptor, CommandKind, TabPosition};

/// Normalize a key string so equivalent spellings compare equal.
pub fn normalize_keys(keys: &str) -> Result<String> {
    let events = KeyEvent::parse_sequence(keys)?;
    if events.is_empty() {
        return Err(KeynavError::Mapping("empty key sequence".to_string()));
    }
    Ok(events.iter().map(KeyEvent::notation).collect())
}

/// A key-sequence to command table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyMappings {
    map: HashMap<String, CommandDescriptor>,
}

// ---------------------------------------------------------------------------
// TOML form
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MappingFile {
    #[serde(default)]
    map: Vec<MappingEntry>,
}

/// One `[[map]]` entry. Options left out keep the command's defaults.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MappingEntry {
    keys: String,
    command: CommandKind,
    count: Option<u32>,
    no_repeat: Option<bool>,
    repeat_limit: Option<u32>,
    top_frame: Option<bool>,
    background: Option<bool>,
    position: Option<TabPosition>,
    #[serde(default)]
    normal: bool,
}

impl MappingEntry {
    fn into_descriptor(self) -> (String, CommandDescriptor) {
        let mut descriptor = CommandDescriptor::new(self.command);
        let options = &mut descriptor.options;
        options.count = self.count.or(options.count);
        options.no_repeat = self.no_repeat.unwrap_or(options.no_repeat);
        options.repeat_limit = self.repeat_limit.or(options.repeat_limit);
        options.top_frame = self.top_frame.unwrap_or(options.top_frame);
        options.background = self.background.unwrap_or(options.background);
        options.position = self.position.or(options.position);
        options.normal = self.normal;
        (self.keys, descriptor)
    }
}

impl KeyMappings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `keys` to `descriptor`, replacing any existing binding.
    pub fn insert(&mut self, keys: &str, descriptor: CommandDescriptor) -> Result<()> {
        self.map.insert(normalize_keys(keys)?, descriptor);
        Ok(())
    }

    /// Bind `keys` to a command with its default options.
    pub fn bind(&mut self, keys: &str, command: CommandKind) -> Result<()> {
        self.insert(keys, CommandDescriptor::new(command))
    }

    /// Look up a normalized key sequence.
    pub fn get(&self, keys: &str) -> Option<&CommandDescriptor> {
        self.map.get(keys)
    }

    /// Whether some binding is strictly longer than `keys` and starts with it.
    pub fn is_prefix(&self, keys: &str) -> bool {
        self.map
            .keys()
            .any(|k| k.len() > keys.len() && k.starts_with(keys))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Bindings sorted by key sequence.
    pub fn sorted(&self) -> Vec<(&str, &CommandDescriptor)> {
        let mut entries: Vec<_> = self.map.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_by_key(|(k, _)| *k);
        entries
    }

    /// Parse `[[map]]` entries from TOML.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let file: MappingFile = toml::from_str(toml_str)
            .map_err(|e| KeynavError::Mapping(format!("mapping file: {e}")))?;
        let mut mappings = Self::new();
        for entry in file.map {
            let (keys, descriptor) = entry.into_descriptor();
            mappings.insert(&keys, descriptor)?;
        }
        Ok(mappings)
    }

    /// Parse the session-store JSON form: an object of key sequence to
    /// descriptor.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: HashMap<String, CommandDescriptor> = serde_json::from_str(json)?;
        let mut mappings = Self::new();
        for (keys, descriptor) in raw {
            mappings.insert(&keys, descriptor)?;
        }
        Ok(mappings)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.map)?)
    }

    /// Load a mapping file; `.json` files use the JSON form, anything else
    /// is read as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mappings = if path.extension().is_some_and(|e| e == "json") {
            Self::from_json_str(&text)?
        } else {
            Self::from_toml_str(&text)?
        };
        log::info!("Loaded {} key mappings from {}", mappings.len(), path.display());
        Ok(mappings)
    }

    /// The stock bindings.
    pub fn defaults() -> Self {
        use crate::command::{LinkHintsAction as L, MarksAction as M, VomnibarAction as V};
        use CommandKind::*;
        const DEFAULTS: &[(&str, CommandKind)] = &[
            ("j", ScrollDown),
            ("<c-e>", ScrollDown),
            ("k", ScrollUp),
            ("<c-y>", ScrollUp),
            ("h", ScrollLeft),
            ("l", ScrollRight),
            ("gg", ScrollToTop),
            ("G", ScrollToBottom),
            ("zH", ScrollToLeft),
            ("zL", ScrollToRight),
            ("d", ScrollPageDown),
            ("u", ScrollPageUp),
            ("H", GoBack),
            ("L", GoForward),
            ("gu", GoUp),
            ("gU", GoToRoot),
            ("gs", ToggleViewSource),
            ("yy", CopyCurrentUrl),
            ("p", OpenCopiedUrlInCurrentTab),
            ("P", OpenCopiedUrlInNewTab),
            ("i", EnterInsertMode),
            ("v", EnterVisualMode),
            ("V", EnterVisualLineMode),
            ("/", EnterFindMode),
            ("n", PerformFind),
            ("N", PerformBackwardsFind),
            ("gF", MainFrame),
            ("?", ShowHelp),
            ("[[", GoPrevious),
            ("]]", GoNext),
            ("gi", FocusInput),
            ("f", LinkHints(L::Activate)),
            ("F", LinkHints(L::OpenInNewTab)),
            ("<a-f>", LinkHints(L::WithQueue)),
            ("yf", LinkHints(L::CopyLinkUrl)),
            ("o", Vomnibar(V::Activate)),
            ("O", Vomnibar(V::ActivateInNewTab)),
            ("T", Vomnibar(V::TabSelection)),
            ("b", Vomnibar(V::Bookmarks)),
            ("B", Vomnibar(V::BookmarksInNewTab)),
            ("ge", Vomnibar(V::EditUrl)),
            ("gE", Vomnibar(V::EditUrlInNewTab)),
            ("m", Marks(M::Create)),
            ("`", Marks(M::Goto)),
            ("t", CreateTab),
            ("x", RemoveTab),
            ("X", RestoreTab),
            ("K", NextTab),
            ("gt", NextTab),
            ("J", PreviousTab),
            ("gT", PreviousTab),
        ];
        let map = DEFAULTS
            .iter()
            .map(|&(keys, command)| (keys.to_string(), CommandDescriptor::new(command)))
            .collect();
        Self { map }
    }
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Source of the current key mappings.
///
/// `generation` changes whenever the mappings do, so a consumer only
/// re-reads the table when something changed.
pub trait KeyMappingProvider {
    fn snapshot(&self) -> KeyMappings;

    fn generation(&self) -> u64;
}

/// In-memory provider shared by every normal mode in a frame.
#[derive(Debug, Default)]
pub struct SharedKeyMappings {
    mappings: RefCell<KeyMappings>,
    generation: Cell<u64>,
}

impl SharedKeyMappings {
    pub fn new(mappings: KeyMappings) -> Self {
        Self {
            mappings: RefCell::new(mappings),
            generation: Cell::new(1),
        }
    }

    /// Replace the table, as a storage change notification would.
    pub fn replace(&self, mappings: KeyMappings) {
        *self.mappings.borrow_mut() = mappings;
        self.generation.set(self.generation.get() + 1);
        log::debug!("Key mappings replaced (generation {})", self.generation.get());
    }
}

impl KeyMappingProvider for SharedKeyMappings {
    fn snapshot(&self) -> KeyMappings {
        self.mappings.borrow().clone()
    }

    fn generation(&self) -> u64 {
        self.generation.get()
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// What a key did to the resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Part of a count or an unfinished sequence; the key is consumed.
    Pending,
    /// A complete sequence.
    Command {
        descriptor: CommandDescriptor,
        count: Option<u32>,
    },
    /// Escape discarded a pending count or sequence.
    Cleared,
    /// Not part of any mapping; the key belongs to the page.
    Unmapped,
    /// A bare modifier; nothing changed.
    Ignored,
}

/// Accumulates a count prefix and a key sequence.
#[derive(Debug, Clone, Default)]
pub struct KeyResolver {
    count: Option<u32>,
    pending: String,
}

impl KeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when neither a count nor a partial sequence is pending.
    pub fn is_idle(&self) -> bool {
        self.count.is_none() && self.pending.is_empty()
    }

    pub fn pending_count(&self) -> Option<u32> {
        self.count
    }

    pub fn reset(&mut self) {
        self.count = None;
        self.pending.clear();
    }

    /// Feed one key.
    pub fn feed(&mut self, key: &KeyEvent, mappings: &KeyMappings) -> Resolution {
        if key.is_bare_modifier() {
            return Resolution::Ignored;
        }
        if key.key == Key::Escape && !self.is_idle() {
            self.reset();
            return Resolution::Cleared;
        }

        let notation = key.notation();
        if self.pending.is_empty()
            && mappings.get(&notation).is_none()
            && !mappings.is_prefix(&notation)
            && let Some(digit) = key.digit()
            && (digit != 0 || self.count.is_some())
        {
            let count = self.count.unwrap_or(0).saturating_mul(10).saturating_add(digit);
            self.count = Some(count);
            return Resolution::Pending;
        }

        let sequence = format!("{}{notation}", self.pending);
        if let Some(resolution) = self.advance(&sequence, mappings) {
            return resolution;
        }
        // A dead end mid-sequence: retry the key on its own, keeping the
        // count.
        if !self.pending.is_empty() {
            self.pending.clear();
            if let Some(resolution) = self.advance(&notation, mappings) {
                return resolution;
            }
        }
        self.reset();
        Resolution::Unmapped
    }

    fn advance(&mut self, sequence: &str, mappings: &KeyMappings) -> Option<Resolution> {
        if let Some(descriptor) = mappings.get(sequence) {
            let resolution = Resolution::Command {
                descriptor: descriptor.clone(),
                count: self.count,
            };
            self.reset();
            return Some(resolution);
        }
        if mappings.is_prefix(sequence) {
            self.pending = sequence.to_string();
            return Some(Resolution::Pending);
        }
        None
    }
}
