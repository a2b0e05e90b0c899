//! A single-frame session: the page, its mode stack, and the host services.
//!
//! The base normal mode is always present. Modes returned by commands stack
//! on top of it and see events first; a mode that exits with "restart
//! bubbling" passes the event down to the next one.

use std::rc::Rc;

use anyhow::Result;

use keynav_dom::{MemoryPage, Page, Window};
use keynav_normal::{
    BusMessage, CycleOutcome, DelegatedMode, Dispatched, FocusCycler, FrameInfo, InsertMode,
    KeyMappingProvider, KeyMappings, Mode, NormalMode, NormalModeOptions, NormalOutcome,
    SharedKeyMappings,
};
use keynav_types::input::{InputEvent, Key, KeyEvent};

use crate::host::ConsoleHost;

/// A mode on the stack above the base normal mode.
pub enum Layer {
    FocusInput(FocusCycler),
    Insert(InsertMode),
    Normal(NormalMode),
    PassNextKey { remaining: u32 },
    /// A mode this driver only tracks; Escape leaves it.
    Host(Mode),
}

impl Layer {
    pub fn name(&self) -> &'static str {
        match self {
            Layer::FocusInput(_) => "focus-input",
            Layer::Insert(_) => "insert",
            Layer::Normal(_) => "normal",
            Layer::PassNextKey { .. } => "pass-next-key",
            Layer::Host(mode) => mode.name(),
        }
    }

    fn singleton(&self) -> Option<&'static str> {
        match self {
            Layer::Insert(insert) => insert.singleton,
            Layer::Normal(normal) => normal.options().singleton,
            _ => None,
        }
    }
}

pub struct Session {
    pub page: MemoryPage,
    pub host: ConsoleHost,
    provider: Rc<SharedKeyMappings>,
    frame: FrameInfo,
    base: NormalMode,
    stack: Vec<Layer>,
}

impl Session {
    pub fn new(
        page: MemoryPage,
        host: ConsoleHost,
        mappings: KeyMappings,
        frame: FrameInfo,
    ) -> Self {
        let provider = Rc::new(SharedKeyMappings::new(mappings));
        let base = NormalMode::new(
            NormalModeOptions::default(),
            Rc::clone(&provider) as Rc<dyn KeyMappingProvider>,
            frame,
        );
        Self {
            page,
            host,
            provider,
            frame,
            base,
            stack: Vec::new(),
        }
    }

    /// Names of the active modes, bottom first.
    pub fn mode_names(&self) -> Vec<&'static str> {
        std::iter::once("normal")
            .chain(self.stack.iter().map(Layer::name))
            .collect()
    }

    /// Feed one command-line token: `click:X,Y` or a run of key notation.
    pub fn feed_token(&mut self, token: &str) -> Result<()> {
        if let Some(position) = token.strip_prefix("click:") {
            let (x, y) = position
                .split_once(',')
                .ok_or_else(|| anyhow::anyhow!("bad click position {position:?}"))?;
            let event = InputEvent::PointerClick {
                x: x.trim().parse()?,
                y: y.trim().parse()?,
            };
            return self.handle_event(&event);
        }
        for key in KeyEvent::parse_sequence(token)? {
            self.handle_event(&InputEvent::Key(key))?;
        }
        Ok(())
    }

    /// Offer an event to the mode stack, top first.
    pub fn handle_event(&mut self, event: &InputEvent) -> Result<()> {
        loop {
            let Some(layer) = self.stack.last_mut() else {
                return self.handle_in_base(event);
            };
            match layer {
                Layer::FocusInput(cycler) => match cycler.handle_event(&mut self.page, event) {
                    CycleOutcome::Suppressed | CycleOutcome::Ignored => return Ok(()),
                    CycleOutcome::Exited {
                        handoff,
                        restart_bubbling,
                    } => {
                        self.stack.pop();
                        if let Some(insert) = handoff {
                            self.push_mode(Mode::Insert(insert));
                        }
                        if !restart_bubbling {
                            return Ok(());
                        }
                    },
                },
                Layer::Insert(_) => {
                    if let InputEvent::Key(key) = event {
                        if key.key == Key::Escape {
                            self.stack.pop();
                            log::info!("Insert mode exited");
                        } else {
                            self.type_into_page(key);
                        }
                    }
                    return Ok(());
                },
                Layer::Normal(normal) => {
                    let InputEvent::Key(key) = event else {
                        return Ok(());
                    };
                    let mut env = self.host.env(&mut self.page);
                    let outcome = normal.handle_key(key, &mut env)?;
                    let finished = !normal.is_active();
                    if finished {
                        self.stack.pop();
                    }
                    self.after_normal(outcome, event)?;
                    return Ok(());
                },
                Layer::PassNextKey { remaining } => {
                    if let InputEvent::Key(key) = event
                        && !key.is_bare_modifier()
                    {
                        *remaining = remaining.saturating_sub(1);
                        if *remaining == 0 {
                            self.stack.pop();
                        }
                        log::info!("[page] passed key {key}");
                    }
                    return Ok(());
                },
                Layer::Host(mode) => {
                    if let InputEvent::Key(key) = event {
                        if key.key == Key::Escape {
                            log::info!("Leaving {} mode", mode.name());
                            self.stack.pop();
                        } else {
                            log::info!("[{}] key {key}", mode.name());
                        }
                    }
                    return Ok(());
                },
            }
        }
    }

    fn handle_in_base(&mut self, event: &InputEvent) -> Result<()> {
        let InputEvent::Key(key) = event else {
            log::debug!("Pointer event ignored by normal mode");
            return Ok(());
        };
        let mut env = self.host.env(&mut self.page);
        let outcome = self.base.handle_key(key, &mut env)?;
        self.after_normal(outcome, event)
    }

    fn after_normal(&mut self, outcome: NormalOutcome, event: &InputEvent) -> Result<()> {
        match outcome {
            NormalOutcome::Dispatched(Dispatched::Ran(Some(mode))) => self.push_mode(mode),
            NormalOutcome::Dispatched(Dispatched::Aborted) => log::info!("Command aborted"),
            NormalOutcome::PassThrough => {
                if let InputEvent::Key(key) = event {
                    self.type_into_page(key);
                }
            },
            _ => {},
        }
        self.run_top_frame_requests()
    }

    /// This driver hosts a single frame, so it also plays the top frame.
    fn run_top_frame_requests(&mut self) -> Result<()> {
        let requests = std::mem::take(&mut self.host.bus.top_frame_queue);
        for request in requests {
            let BusMessage::RunInTopFrame {
                origin_frame_id,
                descriptor,
            } = request
            else {
                continue;
            };
            log::info!(
                "Running {} in the top frame for frame {}",
                descriptor.command,
                origin_frame_id.0
            );
            let mut env = self.host.env(&mut self.page);
            let mode = self
                .base
                .dispatcher()
                .run_in_top_frame(origin_frame_id, &descriptor, &mut env)?;
            if let Some(mode) = mode {
                self.push_mode(mode);
            }
        }
        Ok(())
    }

    fn push_mode(&mut self, mode: Mode) {
        let layer = match mode {
            Mode::FocusInput(cycler) => Layer::FocusInput(cycler),
            Mode::Insert(insert) => Layer::Insert(insert),
            Mode::Normal(options) => Layer::Normal(NormalMode::new(
                options,
                Rc::clone(&self.provider) as Rc<dyn KeyMappingProvider>,
                self.frame,
            )),
            Mode::PassNextKey { count } => Layer::PassNextKey { remaining: count },
            Mode::Delegated(DelegatedMode::MainFrame) => {
                log::info!("Frame {} is already the main frame", self.frame.frame_id.0);
                return;
            },
            other => Layer::Host(other),
        };
        if let Some(singleton) = layer.singleton() {
            self.stack.retain(|l| l.singleton() != Some(singleton));
        }
        log::info!("Entered {} mode", layer.name());
        self.stack.push(layer);
    }

    fn type_into_page(&mut self, key: &KeyEvent) {
        match self.page.active_element().filter(|&n| self.page.is_editable(n)) {
            Some(node) => log::info!("[page] typed {key} into node {node}"),
            None => log::info!("[page] key {key} reached the page"),
        }
    }

    /// Tear down every mode, removing any markers still shown.
    pub fn finish(&mut self) {
        while let Some(layer) = self.stack.pop() {
            if let Layer::FocusInput(mut cycler) = layer {
                cycler.exit(&mut self.page);
            }
        }
    }

    /// A short report of the page state.
    pub fn summary(&self) -> Vec<String> {
        let (sx, sy) = self.page.scroll_offset();
        let focused = self.page.active_element().map_or("none".to_string(), |node| {
            let tag = self
                .page
                .tag_name(node)
                .map_or("?".to_string(), |t| t.as_str().to_string());
            match self.page.attribute(node, "id") {
                Some(id) => format!("<{tag}#{id}>"),
                None => format!("<{tag}> (node {node})"),
            }
        });
        vec![
            format!("location: {}", self.page.location()),
            format!("scroll:   ({sx}, {sy})"),
            format!("focused:  {focused}"),
            format!("markers:  {}", self.page.marker_count()),
            format!("messages: {}", self.host.bus.sent.len()),
            format!("modes:    {}", self.mode_names().join(" > ")),
        ]
    }
}
