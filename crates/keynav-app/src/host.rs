//! Console implementations of the host services.

use std::io::{self, BufRead, Write};

use keynav_normal::{BusMessage, Env, Finder, Hud, MessageBus, Prompt};
use keynav_dom::MemoryPage;
use keynav_types::settings::Settings;

use crate::args::PromptPolicy;

/// Logs every message and keeps them for the run summary.
#[derive(Debug, Default)]
pub struct LogBus {
    pub sent: Vec<BusMessage>,
    /// Top-frame requests not yet handled.
    pub top_frame_queue: Vec<BusMessage>,
}

impl MessageBus for LogBus {
    fn send(&mut self, message: BusMessage) {
        match serde_json::to_string(&message) {
            Ok(json) => log::info!("[bus] {json}"),
            Err(e) => log::warn!("[bus] unserializable message {message:?}: {e}"),
        }
        if matches!(message, BusMessage::RunInTopFrame { .. }) {
            self.top_frame_queue.push(message.clone());
        }
        self.sent.push(message);
    }
}

/// Prints notices and keeps an in-process clipboard.
#[derive(Debug, Default)]
pub struct LogHud {
    clipboard: Option<String>,
}

impl Hud for LogHud {
    fn show(&mut self, text: &str, duration_ms: u32) {
        log::info!("[hud] {text} ({duration_ms} ms)");
    }

    fn copy_to_clipboard(&mut self, text: &str) {
        self.clipboard = Some(text.to_string());
    }

    fn paste_from_clipboard(&mut self) -> Option<String> {
        self.clipboard.clone()
    }
}

#[derive(Debug, Default)]
pub struct LogFinder {
    query: String,
}

impl Finder for LogFinder {
    fn update_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    fn save_query(&mut self) {
        log::info!("[find] saved query {:?}", self.query);
    }

    fn find_next(&mut self, backwards: bool) {
        let direction = if backwards { "previous" } else { "next" };
        log::info!("[find] {direction} match for {:?}", self.query);
    }
}

/// Asks on the terminal unless a fixed answer was requested.
#[derive(Debug)]
pub struct ConsolePrompt {
    policy: PromptPolicy,
}

impl ConsolePrompt {
    pub fn new(policy: PromptPolicy) -> Self {
        Self { policy }
    }
}

impl Prompt for ConsolePrompt {
    fn confirm(&mut self, message: &str) -> bool {
        match self.policy {
            PromptPolicy::AlwaysYes => return true,
            PromptPolicy::AlwaysNo => return false,
            PromptPolicy::Ask => {},
        }
        print!("{message} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => matches!(line.trim(), "y" | "Y" | "yes"),
            Err(e) => {
                log::warn!("Could not read answer: {e}");
                false
            },
        }
    }
}

/// The services bundled for building an [`Env`].
pub struct ConsoleHost {
    pub bus: LogBus,
    pub hud: LogHud,
    pub finder: LogFinder,
    pub prompt: ConsolePrompt,
    pub settings: Settings,
}

impl ConsoleHost {
    pub fn new(settings: Settings, policy: PromptPolicy) -> Self {
        Self {
            bus: LogBus::default(),
            hud: LogHud::default(),
            finder: LogFinder::default(),
            prompt: ConsolePrompt::new(policy),
            settings,
        }
    }

    pub fn env<'a>(&'a mut self, page: &'a mut MemoryPage) -> Env<'a> {
        Env {
            frame: page,
            bus: &mut self.bus,
            hud: &mut self.hud,
            finder: &mut self.finder,
            prompt: &mut self.prompt,
            settings: &self.settings,
        }
    }
}
