//! Host services used by command handlers besides the page itself.

use keynav_dom::Frame;
use keynav_types::settings::Settings;

use crate::bus::MessageBus;

/// Heads-up display and clipboard.
pub trait Hud {
    /// Show a transient notice for `duration_ms` milliseconds.
    fn show(&mut self, text: &str, duration_ms: u32);

    fn copy_to_clipboard(&mut self, text: &str);

    /// Clipboard contents, `None` when empty or unavailable.
    fn paste_from_clipboard(&mut self) -> Option<String>;
}

/// Blocking yes/no confirmation.
pub trait Prompt {
    fn confirm(&mut self, message: &str) -> bool;
}

/// The find-mode collaborator.
pub trait Finder {
    /// Replace the active query.
    fn update_query(&mut self, query: &str);

    /// Store the active query in find history.
    fn save_query(&mut self);

    /// Jump to the next (or previous) match.
    fn find_next(&mut self, backwards: bool);
}

/// Everything a command handler may touch.
pub struct Env<'a> {
    pub frame: &'a mut dyn Frame,
    pub bus: &'a mut dyn MessageBus,
    pub hud: &'a mut dyn Hud,
    pub finder: &'a mut dyn Finder,
    pub prompt: &'a mut dyn Prompt,
    pub settings: &'a Settings,
}
