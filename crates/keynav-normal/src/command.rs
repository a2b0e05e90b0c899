//! Command kinds and command descriptors.
//!
//! A key mapping resolves to a [`CommandDescriptor`]: the command to run and
//! its static options. Command names use the familiar camel-case spelling
//! (`scrollDown`) and the dotted form for delegated families
//! (`LinkHints.activateMode`); both parse into [`CommandKind`] once, when a
//! mapping is loaded.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use keynav_types::error::KeynavError;

/// Link-hint variants handled by the link-hints mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkHintsAction {
    Activate,
    OpenInNewTab,
    OpenInNewForegroundTab,
    WithQueue,
    OpenIncognito,
    DownloadLink,
    CopyLinkUrl,
}

/// Vomnibar variants handled by the top frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VomnibarAction {
    Activate,
    ActivateInNewTab,
    TabSelection,
    Bookmarks,
    BookmarksInNewTab,
    EditUrl,
    EditUrlInNewTab,
}

/// Mark variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarksAction {
    Create,
    Goto,
}

/// Every command a key can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    // Scrolling
    ScrollToBottom,
    ScrollToTop,
    ScrollToLeft,
    ScrollToRight,
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    ScrollFullPageUp,
    ScrollFullPageDown,
    ScrollLeft,
    ScrollRight,
    // History
    GoBack,
    GoForward,
    // URL manipulation
    GoUp,
    GoToRoot,
    ToggleViewSource,
    CopyCurrentUrl,
    OpenCopiedUrlInNewTab,
    OpenCopiedUrlInCurrentTab,
    // Mode changes
    EnterInsertMode,
    EnterVisualMode,
    EnterVisualLineMode,
    EnterFindMode,
    // Find
    PerformFind,
    PerformBackwardsFind,
    FindSelected,
    FindSelectedBackwards,
    // Misc
    MainFrame,
    ShowHelp,
    PassNextKey,
    GoPrevious,
    GoNext,
    FocusInput,
    // Delegated families
    LinkHints(LinkHintsAction),
    Vomnibar(VomnibarAction),
    Marks(MarksAction),
    // Tab commands, run by the background process
    CreateTab,
    RemoveTab,
    RestoreTab,
    NextTab,
    PreviousTab,
    CloseTabsOnLeft,
    CloseTabsOnRight,
}

impl CommandKind {
    /// All command kinds, in registry order.
    pub fn all() -> Vec<CommandKind> {
        use CommandKind::*;
        let mut kinds = vec![
            ScrollToBottom,
            ScrollToTop,
            ScrollToLeft,
            ScrollToRight,
            ScrollUp,
            ScrollDown,
            ScrollPageUp,
            ScrollPageDown,
            ScrollFullPageUp,
            ScrollFullPageDown,
            ScrollLeft,
            ScrollRight,
            GoBack,
            GoForward,
            GoUp,
            GoToRoot,
            ToggleViewSource,
            CopyCurrentUrl,
            OpenCopiedUrlInNewTab,
            OpenCopiedUrlInCurrentTab,
            EnterInsertMode,
            EnterVisualMode,
            EnterVisualLineMode,
            EnterFindMode,
            PerformFind,
            PerformBackwardsFind,
            FindSelected,
            FindSelectedBackwards,
            MainFrame,
            ShowHelp,
            PassNextKey,
            GoPrevious,
            GoNext,
            FocusInput,
        ];
        kinds.extend(
            [
                LinkHintsAction::Activate,
                LinkHintsAction::OpenInNewTab,
                LinkHintsAction::OpenInNewForegroundTab,
                LinkHintsAction::WithQueue,
                LinkHintsAction::OpenIncognito,
                LinkHintsAction::DownloadLink,
                LinkHintsAction::CopyLinkUrl,
            ]
            .map(LinkHints),
        );
        kinds.extend(
            [
                VomnibarAction::Activate,
                VomnibarAction::ActivateInNewTab,
                VomnibarAction::TabSelection,
                VomnibarAction::Bookmarks,
                VomnibarAction::BookmarksInNewTab,
                VomnibarAction::EditUrl,
                VomnibarAction::EditUrlInNewTab,
            ]
            .map(Vomnibar),
        );
        kinds.extend([MarksAction::Create, MarksAction::Goto].map(Marks));
        kinds.extend([
            CreateTab,
            RemoveTab,
            RestoreTab,
            NextTab,
            PreviousTab,
            CloseTabsOnLeft,
            CloseTabsOnRight,
        ]);
        kinds
    }

    /// The registry name of the command.
    pub fn name(&self) -> &'static str {
        use CommandKind::*;
        match self {
            ScrollToBottom => "scrollToBottom",
            ScrollToTop => "scrollToTop",
            ScrollToLeft => "scrollToLeft",
            ScrollToRight => "scrollToRight",
            ScrollUp => "scrollUp",
            ScrollDown => "scrollDown",
            ScrollPageUp => "scrollPageUp",
            ScrollPageDown => "scrollPageDown",
            ScrollFullPageUp => "scrollFullPageUp",
            ScrollFullPageDown => "scrollFullPageDown",
            ScrollLeft => "scrollLeft",
            ScrollRight => "scrollRight",
            GoBack => "goBack",
            GoForward => "goForward",
            GoUp => "goUp",
            GoToRoot => "goToRoot",
            ToggleViewSource => "toggleViewSource",
            CopyCurrentUrl => "copyCurrentUrl",
            OpenCopiedUrlInNewTab => "openCopiedUrlInNewTab",
            OpenCopiedUrlInCurrentTab => "openCopiedUrlInCurrentTab",
            EnterInsertMode => "enterInsertMode",
            EnterVisualMode => "enterVisualMode",
            EnterVisualLineMode => "enterVisualLineMode",
            EnterFindMode => "enterFindMode",
            PerformFind => "performFind",
            PerformBackwardsFind => "performBackwardsFind",
            FindSelected => "findSelected",
            FindSelectedBackwards => "findSelectedBackwards",
            MainFrame => "mainFrame",
            ShowHelp => "showHelp",
            PassNextKey => "passNextKey",
            GoPrevious => "goPrevious",
            GoNext => "goNext",
            FocusInput => "focusInput",
            LinkHints(LinkHintsAction::Activate) => "LinkHints.activateMode",
            LinkHints(LinkHintsAction::OpenInNewTab) => "LinkHints.activateModeToOpenInNewTab",
            LinkHints(LinkHintsAction::OpenInNewForegroundTab) => {
                "LinkHints.activateModeToOpenInNewForegroundTab"
            },
            LinkHints(LinkHintsAction::WithQueue) => "LinkHints.activateModeWithQueue",
            LinkHints(LinkHintsAction::OpenIncognito) => "LinkHints.activateModeToOpenIncognito",
            LinkHints(LinkHintsAction::DownloadLink) => "LinkHints.activateModeToDownloadLink",
            LinkHints(LinkHintsAction::CopyLinkUrl) => "LinkHints.activateModeToCopyLinkUrl",
            Vomnibar(VomnibarAction::Activate) => "Vomnibar.activate",
            Vomnibar(VomnibarAction::ActivateInNewTab) => "Vomnibar.activateInNewTab",
            Vomnibar(VomnibarAction::TabSelection) => "Vomnibar.activateTabSelection",
            Vomnibar(VomnibarAction::Bookmarks) => "Vomnibar.activateBookmarks",
            Vomnibar(VomnibarAction::BookmarksInNewTab) => "Vomnibar.activateBookmarksInNewTab",
            Vomnibar(VomnibarAction::EditUrl) => "Vomnibar.activateEditUrl",
            Vomnibar(VomnibarAction::EditUrlInNewTab) => "Vomnibar.activateEditUrlInNewTab",
            Marks(MarksAction::Create) => "Marks.activateCreateMode",
            Marks(MarksAction::Goto) => "Marks.activateGotoMode",
            CreateTab => "createTab",
            RemoveTab => "removeTab",
            RestoreTab => "restoreTab",
            NextTab => "nextTab",
            PreviousTab => "previousTab",
            CloseTabsOnLeft => "closeTabsOnLeft",
            CloseTabsOnRight => "closeTabsOnRight",
        }
    }

    /// Look a command up by registry name.
    pub fn from_name(name: &str) -> Option<CommandKind> {
        Self::all().into_iter().find(|k| k.name() == name)
    }

    /// Commands for which an absent count means "every tab in that
    /// direction" rather than 1.
    pub fn allows_null_count(&self) -> bool {
        matches!(self, Self::CloseTabsOnLeft | Self::CloseTabsOnRight)
    }

    /// Registry defaults for the command's options.
    pub fn default_options(&self) -> CommandOptions {
        use CommandKind::*;
        let mut options = CommandOptions::default();
        match self {
            ToggleViewSource | CopyCurrentUrl | OpenCopiedUrlInCurrentTab | EnterInsertMode
            | EnterVisualMode | EnterVisualLineMode | EnterFindMode | FindSelected
            | FindSelectedBackwards | GoPrevious | GoNext | Marks(_)
            | LinkHints(LinkHintsAction::WithQueue) => {
                options.no_repeat = true;
            },
            OpenCopiedUrlInNewTab => {
                options.repeat_limit = Some(20);
            },
            MainFrame | ShowHelp | Vomnibar(_) => {
                options.top_frame = true;
                options.no_repeat = true;
            },
            CreateTab | RemoveTab | RestoreTab => {
                options.background = true;
                options.repeat_limit = Some(20);
            },
            NextTab | PreviousTab | CloseTabsOnLeft | CloseTabsOnRight => {
                options.background = true;
            },
            _ => {},
        }
        options
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CommandKind {
    type Err = KeynavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| KeynavError::Mapping(format!("unknown command {s:?}")))
    }
}

impl TryFrom<String> for CommandKind {
    type Error = KeynavError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CommandKind> for String {
    fn from(kind: CommandKind) -> Self {
        kind.name().to_string()
    }
}

impl Serialize for CommandKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for CommandKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        CommandKind::try_from(name).map_err(serde::de::Error::custom)
    }
}

/// Where a new tab opens relative to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabPosition {
    Start,
    Before,
    After,
    End,
}

/// Static per-mapping options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommandOptions {
    /// Multiplier applied to the typed count.
    pub count: Option<u32>,
    /// Ignore the typed count.
    pub no_repeat: bool,
    /// Ask before repeating more than this many times.
    pub repeat_limit: Option<u32>,
    /// Run in the page's top-level frame.
    pub top_frame: bool,
    /// Run in the background process.
    pub background: bool,
    /// Placement of tabs opened by the command.
    pub position: Option<TabPosition>,
    /// `passNextKey` only: enter a fresh normal mode instead.
    pub normal: bool,
}

/// A command plus its options, as resolved from a key sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub command: CommandKind,
    #[serde(default)]
    pub options: CommandOptions,
}

impl CommandDescriptor {
    /// A descriptor with the command's registry defaults.
    pub fn new(command: CommandKind) -> Self {
        Self {
            command,
            options: command.default_options(),
        }
    }

    /// A descriptor with explicit options.
    pub fn with_options(command: CommandKind, options: CommandOptions) -> Self {
        Self { command, options }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_for_every_kind() {
        let all = CommandKind::all();
        assert_eq!(all.len(), 57);
        for kind in all {
            assert_eq!(CommandKind::from_name(kind.name()), Some(kind), "{kind}");
        }
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = CommandKind::all().iter().map(|k| k.name()).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(names.len(), before);
    }

    #[test]
    fn dotted_names_parse() {
        assert_eq!(
            "LinkHints.activateModeToCopyLinkUrl".parse::<CommandKind>().unwrap(),
            CommandKind::LinkHints(LinkHintsAction::CopyLinkUrl)
        );
        assert_eq!(
            "Vomnibar.activate".parse::<CommandKind>().unwrap(),
            CommandKind::Vomnibar(VomnibarAction::Activate)
        );
    }

    #[test]
    fn unknown_name_is_mapping_error() {
        let err = "flyAway".parse::<CommandKind>().unwrap_err();
        assert!(matches!(err, KeynavError::Mapping(_)));
    }

    #[test]
    fn only_directional_close_allows_null_count() {
        let allowing: Vec<_> = CommandKind::all()
            .into_iter()
            .filter(CommandKind::allows_null_count)
            .collect();
        assert_eq!(
            allowing,
            vec![CommandKind::CloseTabsOnLeft, CommandKind::CloseTabsOnRight]
        );
    }

    #[test]
    fn registry_defaults() {
        assert!(CommandKind::ShowHelp.default_options().top_frame);
        assert!(CommandKind::CloseTabsOnLeft.default_options().background);
        assert!(CommandKind::GoNext.default_options().no_repeat);
        assert_eq!(CommandKind::CreateTab.default_options().repeat_limit, Some(20));
        assert_eq!(CommandKind::ScrollDown.default_options(), CommandOptions::default());
    }

    #[test]
    fn descriptor_json_shape() {
        let desc = CommandDescriptor::with_options(
            CommandKind::OpenCopiedUrlInNewTab,
            CommandOptions {
                position: Some(TabPosition::After),
                repeat_limit: Some(5),
                ..CommandOptions::default()
            },
        );
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(json["command"], "openCopiedUrlInNewTab");
        assert_eq!(json["options"]["position"], "after");
        assert_eq!(json["options"]["repeatLimit"], 5);

        let back: CommandDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, desc);
    }

    #[test]
    fn descriptor_options_default_when_absent() {
        let desc: CommandDescriptor =
            serde_json::from_str(r#"{"command":"scrollDown"}"#).unwrap();
        assert_eq!(desc.command, CommandKind::ScrollDown);
        assert_eq!(desc.options, CommandOptions::default());
    }

    #[test]
    fn descriptor_rejects_unknown_command() {
        let err = serde_json::from_str::<CommandDescriptor>(r#"{"command":"nope"}"#);
        assert!(err.is_err());
    }
}
