//! Command-line arguments.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

pub const USAGE: &str = "\
usage: keynav-app <page.toml> [options] <keys>...

options:
  --settings <file>    settings TOML
  --mappings <file>    key mappings (TOML, or JSON with a .json extension)
  --frame <id>         frame id of the page (default 1)
  --ui-component       treat the page as an extension UI frame
  --yes | --no         answer repeat-limit prompts without asking

keys use mapping notation (`3j`, `gg`, `<s-tab>`); `click:X,Y` clicks at a
page position.";

/// How repeat-limit prompts are answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPolicy {
    Ask,
    AlwaysYes,
    AlwaysNo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub page: PathBuf,
    pub settings: Option<PathBuf>,
    pub mappings: Option<PathBuf>,
    pub frame_id: u32,
    pub ui_component: bool,
    pub prompt: PromptPolicy,
    pub keys: Vec<String>,
}

impl Args {
    /// Parse arguments, excluding the program name.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut page = None;
        let mut settings = None;
        let mut mappings = None;
        let mut frame_id = 1;
        let mut ui_component = false;
        let mut prompt = PromptPolicy::Ask;
        let mut keys = Vec::new();

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--settings" => {
                    settings = Some(PathBuf::from(iter.next().context("--settings needs a file")?));
                },
                "--mappings" => {
                    mappings = Some(PathBuf::from(iter.next().context("--mappings needs a file")?));
                },
                "--frame" => {
                    let value = iter.next().context("--frame needs an id")?;
                    frame_id = value
                        .parse()
                        .with_context(|| format!("bad frame id {value:?}"))?;
                },
                "--ui-component" => ui_component = true,
                "--yes" => prompt = PromptPolicy::AlwaysYes,
                "--no" => prompt = PromptPolicy::AlwaysNo,
                "-h" | "--help" => bail!("{USAGE}"),
                flag if flag.starts_with("--") => bail!("unknown option {flag}\n\n{USAGE}"),
                _ if page.is_none() => page = Some(PathBuf::from(&arg)),
                _ => keys.push(arg.clone()),
            }
        }

        let Some(page) = page else {
            bail!("missing page fixture\n\n{USAGE}");
        };
        Ok(Self {
            page,
            settings,
            mappings,
            frame_id,
            ui_component,
            prompt,
            keys,
        })
    }
}
