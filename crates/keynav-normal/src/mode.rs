//! Interaction modes produced by commands.
//!
//! A handler that changes how keys are interpreted returns a [`Mode`]; the
//! host pushes it onto its mode stack. Modes owned by this crate carry their
//! full state. Modes implemented elsewhere (link hints, the vomnibar, marks,
//! the help dialog) are returned as [`DelegatedMode`] requests.

use keynav_dom::NodeId;

use crate::bus::FrameId;
use crate::command::{LinkHintsAction, MarksAction, VomnibarAction};
use crate::focus::FocusCycler;

/// Singleton key used when the focus cycler hands off to insert mode.
pub const FOCUS_INPUT_SINGLETON: &str = "post-find-mode/focus-input";

/// Singleton key for a nested normal mode.
pub const NORMAL_MODE_SINGLETON: &str = "enterNormalMode";

/// Indicator shown by a nested normal mode.
pub const NORMAL_MODE_INDICATOR: &str = "Normal mode (pass keys disabled)";

/// Keys go to the page instead of being interpreted as commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertMode {
    /// Stay active regardless of which element has focus.
    pub global: bool,
    /// Exit when focus moves to another element.
    pub exit_on_focus: bool,
    /// The element being edited, if the mode is tied to one.
    pub target: Option<NodeId>,
    pub show_indicator: bool,
    /// At most one mode with a given singleton key is active at a time.
    pub singleton: Option<&'static str>,
}

impl InsertMode {
    /// Insert mode entered explicitly by the user.
    pub fn global() -> Self {
        Self {
            global: true,
            exit_on_focus: true,
            target: None,
            show_indicator: true,
            singleton: None,
        }
    }

    /// Insert mode tied to one element, with no indicator.
    pub fn targeted(target: NodeId) -> Self {
        Self {
            global: false,
            exit_on_focus: false,
            target: Some(target),
            show_indicator: false,
            singleton: Some(FOCUS_INPUT_SINGLETON),
        }
    }
}

/// Options for a nested normal mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalModeOptions {
    pub indicator: Option<String>,
    pub exit_on_escape: bool,
    pub singleton: Option<&'static str>,
    /// Number of commands to run before the mode exits. `None` runs until
    /// the mode is exited explicitly.
    pub count: Option<u32>,
}

impl NormalModeOptions {
    /// The mode entered by `passNextKey` with the `normal` option.
    pub fn pass_keys_disabled(count: u32) -> Self {
        Self {
            indicator: Some(NORMAL_MODE_INDICATOR.to_string()),
            exit_on_escape: true,
            singleton: Some(NORMAL_MODE_SINGLETON),
            count: Some(count),
        }
    }
}

/// A mode implemented outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegatedMode {
    /// Move focus to the top-level frame.
    MainFrame,
    /// Toggle the help dialog; `source_frame` gets focus back on close.
    HelpDialog { source_frame: FrameId },
    LinkHints { action: LinkHintsAction, count: u32 },
    Vomnibar { action: VomnibarAction, source_frame: FrameId },
    Marks { action: MarksAction },
}

/// A mode a command asks the host to activate.
#[derive(Debug)]
pub enum Mode {
    Insert(InsertMode),
    /// The input focus cycler, already showing its markers.
    FocusInput(FocusCycler),
    /// A nested normal mode the host builds with its key mappings.
    Normal(NormalModeOptions),
    /// Pass the next `count` keys to the page.
    PassNextKey { count: u32 },
    Visual { line: bool },
    Find,
    Delegated(DelegatedMode),
}

impl Mode {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Insert(_) => "insert",
            Mode::FocusInput(_) => "focus-input",
            Mode::Normal(_) => "normal",
            Mode::PassNextKey { .. } => "pass-next-key",
            Mode::Visual { line: false } => "visual",
            Mode::Visual { line: true } => "visual-line",
            Mode::Find => "find",
            Mode::Delegated(DelegatedMode::MainFrame) => "main-frame",
            Mode::Delegated(DelegatedMode::HelpDialog { .. }) => "help-dialog",
            Mode::Delegated(DelegatedMode::LinkHints { .. }) => "link-hints",
            Mode::Delegated(DelegatedMode::Vomnibar { .. }) => "vomnibar",
            Mode::Delegated(DelegatedMode::Marks { .. }) => "marks",
        }
    }
}
