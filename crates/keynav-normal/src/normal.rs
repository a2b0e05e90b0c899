//! Normal mode: keys resolve to commands, commands are dispatched.

use std::rc::Rc;

use keynav_types::error::Result;
use keynav_types::input::{Key, KeyEvent};

use crate::bus::FrameInfo;
use crate::dispatch::{CommandDispatcher, Dispatched};
use crate::host::Env;
use crate::mappings::{KeyMappingProvider, KeyMappings, KeyResolver, Resolution};
use crate::mode::NormalModeOptions;

/// What normal mode did with a key.
#[derive(Debug)]
pub enum NormalOutcome {
    /// Held as part of a count or sequence.
    Consumed,
    /// Not a mapped key; it belongs to the page.
    PassThrough,
    /// A command was dispatched.
    Dispatched(Dispatched),
    /// The mode exited (Escape, or its command budget ran out).
    Exited,
}

pub struct NormalMode {
    options: NormalModeOptions,
    provider: Rc<dyn KeyMappingProvider>,
    mappings: KeyMappings,
    generation: u64,
    resolver: KeyResolver,
    dispatcher: CommandDispatcher,
    commands_left: Option<u32>,
    active: bool,
}

impl NormalMode {
    /// Build a normal mode reading its bindings from `provider`.
    pub fn new(
        options: NormalModeOptions,
        provider: Rc<dyn KeyMappingProvider>,
        frame: FrameInfo,
    ) -> Self {
        let mappings = provider.snapshot();
        let generation = provider.generation();
        if let Some(indicator) = &options.indicator {
            log::info!("Entering normal mode ({indicator})");
        }
        Self {
            commands_left: options.count,
            options,
            provider,
            mappings,
            generation,
            resolver: KeyResolver::new(),
            dispatcher: CommandDispatcher::new(frame),
            active: true,
        }
    }

    pub fn options(&self) -> &NormalModeOptions {
        &self.options
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    pub fn mappings(&self) -> &KeyMappings {
        &self.mappings
    }

    /// Pick up a new mapping table if the provider changed.
    fn refresh(&mut self) {
        let generation = self.provider.generation();
        if generation != self.generation {
            self.mappings = self.provider.snapshot();
            self.generation = generation;
            self.resolver.reset();
            log::info!("Reloaded {} key mappings", self.mappings.len());
        }
    }

    pub fn exit(&mut self) {
        if self.active {
            self.active = false;
            self.resolver.reset();
            log::info!("Normal mode exited");
        }
    }

    /// Handle one key press.
    pub fn handle_key(&mut self, key: &KeyEvent, env: &mut Env<'_>) -> Result<NormalOutcome> {
        if !self.active {
            return Ok(NormalOutcome::PassThrough);
        }
        self.refresh();

        if key.key == Key::Escape && self.options.exit_on_escape && self.resolver.is_idle() {
            self.exit();
            return Ok(NormalOutcome::Exited);
        }

        match self.resolver.feed(key, &self.mappings) {
            Resolution::Pending | Resolution::Cleared => Ok(NormalOutcome::Consumed),
            Resolution::Unmapped | Resolution::Ignored => Ok(NormalOutcome::PassThrough),
            Resolution::Command { descriptor, count } => {
                let dispatched = self.dispatcher.dispatch(&descriptor, count, env)?;
                if let Some(left) = self.commands_left.as_mut() {
                    *left = left.saturating_sub(1);
                    if *left == 0 {
                        self.exit();
                    }
                }
                Ok(NormalOutcome::Dispatched(dispatched))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BusMessage, FrameId};
    use crate::command::CommandKind;
    use crate::mappings::SharedKeyMappings;
    use crate::mode::Mode;
    use crate::test_utils::{TestHost, input_row_page};
    use keynav_dom::{MemoryPage, Window};

    fn press(
        mode: &mut NormalMode,
        keys: &str,
        host: &mut TestHost,
        page: &mut MemoryPage,
    ) -> Vec<NormalOutcome> {
        KeyEvent::parse_sequence(keys)
            .unwrap()
            .iter()
            .map(|k| {
                let mut env = host.env(page);
                mode.handle_key(k, &mut env).unwrap()
            })
            .collect()
    }

    fn tall_page() -> MemoryPage {
        let mut page = MemoryPage::new("https://example.com/a/b", 800, 600);
        page.set_content_size(800, 10_000);
        page
    }

    fn shared() -> Rc<SharedKeyMappings> {
        Rc::new(SharedKeyMappings::new(KeyMappings::defaults()))
    }

    #[test]
    fn keys_drive_commands() {
        let mut mode = NormalMode::new(
            NormalModeOptions::default(),
            shared(),
            FrameInfo::page(FrameId(1)),
        );
        let mut host = TestHost::new();
        let mut page = tall_page();
        let outcomes = press(&mut mode, "3j", &mut host, &mut page);
        assert!(matches!(outcomes[0], NormalOutcome::Consumed));
        assert!(matches!(outcomes[1], NormalOutcome::Dispatched(Dispatched::Ran(None))));
        assert_eq!(page.scroll_offset().1, 180);

        let outcomes = press(&mut mode, "Q", &mut host, &mut page);
        assert!(matches!(outcomes[0], NormalOutcome::PassThrough));
    }

    #[test]
    fn background_and_mode_results() {
        let mut mode = NormalMode::new(
            NormalModeOptions::default(),
            shared(),
            FrameInfo::page(FrameId(1)),
        );
        let mut host = TestHost::new();
        let (mut page, _) = input_row_page(2);
        press(&mut mode, "2K", &mut host, &mut page);
        assert!(matches!(
            host.bus.sent.as_slice(),
            [BusMessage::RunInBackground { count: Some(2), .. }]
        ));

        let outcomes = press(&mut mode, "gi", &mut host, &mut page);
        assert!(matches!(
            outcomes[1],
            NormalOutcome::Dispatched(Dispatched::Ran(Some(Mode::FocusInput(_))))
        ));
    }

    #[test]
    fn provider_changes_are_picked_up() {
        let provider = shared();
        let mut mode = NormalMode::new(
            NormalModeOptions::default(),
            Rc::clone(&provider) as Rc<dyn KeyMappingProvider>,
            FrameInfo::page(FrameId(1)),
        );
        let mut host = TestHost::new();
        let mut page = tall_page();

        let mut remapped = KeyMappings::new();
        remapped.bind("j", CommandKind::ScrollUp).unwrap();
        remapped.bind("w", CommandKind::ScrollDown).unwrap();
        provider.replace(remapped);

        press(&mut mode, "w", &mut host, &mut page);
        assert_eq!(page.scroll_offset().1, 60);
        press(&mut mode, "j", &mut host, &mut page);
        assert_eq!(page.scroll_offset().1, 0);
        assert_eq!(mode.mappings().len(), 2);
    }

    #[test]
    fn nested_mode_exits_on_escape() {
        let mut mode = NormalMode::new(
            NormalModeOptions {
                exit_on_escape: true,
                ..NormalModeOptions::default()
            },
            shared(),
            FrameInfo::page(FrameId(1)),
        );
        let mut host = TestHost::new();
        let mut page = tall_page();
        // The first escape only clears the pending "g".
        let outcomes = press(&mut mode, "g<esc>", &mut host, &mut page);
        assert!(matches!(outcomes[1], NormalOutcome::Consumed));
        assert!(mode.is_active());
        let outcomes = press(&mut mode, "<esc>j", &mut host, &mut page);
        assert!(matches!(outcomes[0], NormalOutcome::Exited));
        assert!(matches!(outcomes[1], NormalOutcome::PassThrough));
        assert_eq!(page.scroll_offset().1, 0);
    }

    #[test]
    fn command_budget_ends_the_mode() {
        let mut mode = NormalMode::new(
            NormalModeOptions::pass_keys_disabled(2),
            shared(),
            FrameInfo::page(FrameId(1)),
        );
        let mut host = TestHost::new();
        let mut page = tall_page();
        press(&mut mode, "jj", &mut host, &mut page);
        assert!(!mode.is_active());
        press(&mut mode, "j", &mut host, &mut page);
        assert_eq!(page.scroll_offset().1, 120);
    }

    #[test]
    fn declined_prompt_reports_abort() {
        let mut mode = NormalMode::new(
            NormalModeOptions::default(),
            shared(),
            FrameInfo::page(FrameId(1)),
        );
        let mut host = TestHost::new();
        host.prompt.answer = false;
        let mut page = tall_page();
        let outcomes = press(&mut mode, "30t", &mut host, &mut page);
        assert!(matches!(
            outcomes[2],
            NormalOutcome::Dispatched(Dispatched::Aborted)
        ));
        assert!(host.bus.sent.is_empty());
    }
}
