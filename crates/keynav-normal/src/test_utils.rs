//! Test doubles and page builders shared by the unit tests.

use keynav_dom::{Display, ElementData, MemoryPage, NodeId, TagName, Visibility};
use keynav_types::settings::Settings;

use crate::bus::{BusMessage, MessageBus};
use crate::host::{Env, Finder, Hud, Prompt};

// ---------------------------------------------------------------------------
// Host doubles
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RecordingBus {
    pub sent: Vec<BusMessage>,
}

impl MessageBus for RecordingBus {
    fn send(&mut self, message: BusMessage) {
        self.sent.push(message);
    }
}

#[derive(Debug, Default)]
pub struct RecordingHud {
    pub notices: Vec<(String, u32)>,
    pub clipboard: Option<String>,
}

impl Hud for RecordingHud {
    fn show(&mut self, text: &str, duration_ms: u32) {
        self.notices.push((text.to_string(), duration_ms));
    }

    fn copy_to_clipboard(&mut self, text: &str) {
        self.clipboard = Some(text.to_string());
    }

    fn paste_from_clipboard(&mut self) -> Option<String> {
        self.clipboard.clone()
    }
}

/// Answers every confirmation with `answer` and records the questions.
#[derive(Debug)]
pub struct ScriptedPrompt {
    pub answer: bool,
    pub asked: Vec<String>,
}

impl ScriptedPrompt {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: Vec::new(),
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&mut self, message: &str) -> bool {
        self.asked.push(message.to_string());
        self.answer
    }
}

#[derive(Debug, Default)]
pub struct RecordingFinder {
    pub queries: Vec<String>,
    pub saved: usize,
    /// One entry per `find_next`, `true` when backwards.
    pub steps: Vec<bool>,
}

impl Finder for RecordingFinder {
    fn update_query(&mut self, query: &str) {
        self.queries.push(query.to_string());
    }

    fn save_query(&mut self) {
        self.saved += 1;
    }

    fn find_next(&mut self, backwards: bool) {
        self.steps.push(backwards);
    }
}

/// All host doubles plus default settings.
pub struct TestHost {
    pub bus: RecordingBus,
    pub hud: RecordingHud,
    pub finder: RecordingFinder,
    pub prompt: ScriptedPrompt,
    pub settings: Settings,
}

impl TestHost {
    pub fn new() -> Self {
        Self {
            bus: RecordingBus::default(),
            hud: RecordingHud::default(),
            finder: RecordingFinder::default(),
            prompt: ScriptedPrompt::answering(true),
            settings: Settings::default(),
        }
    }

    pub fn env<'a>(&'a mut self, frame: &'a mut MemoryPage) -> Env<'a> {
        Env {
            frame,
            bus: &mut self.bus,
            hud: &mut self.hud,
            finder: &mut self.finder,
            prompt: &mut self.prompt,
            settings: &self.settings,
        }
    }
}

// ---------------------------------------------------------------------------
// Page builders
// ---------------------------------------------------------------------------

/// A tall page with one text input per row, all inside the viewport.
pub fn input_row_page(n: usize) -> (MemoryPage, Vec<NodeId>) {
    let inputs: Vec<(&str, i32)> = (0..n).map(|_| ("text", 0)).collect();
    page_with_inputs(&inputs)
}

/// Inputs with the given `type` and `tabindex` (0 leaves it unset).
pub fn page_with_inputs(inputs: &[(&str, i32)]) -> (MemoryPage, Vec<NodeId>) {
    let mut page = MemoryPage::new("https://example.com/form", 800, 600);
    page.set_content_size(800, 2000);
    let root = page.document.root;
    let ids = inputs
        .iter()
        .enumerate()
        .map(|(i, &(input_type, tab_index))| {
            let mut data = ElementData::new(TagName::Input)
                .with_attr("type", input_type)
                .with_rect(10, 10 + 30 * i as i32, 100, 20);
            if tab_index != 0 {
                data.set_attribute("tabindex", &tab_index.to_string());
            }
            page.document.append_element(root, data)
        })
        .collect();
    (page, ids)
}

/// One clickable element for [`page_with_links`].
#[derive(Debug, Clone)]
pub struct TestLink {
    pub tag: TagName,
    pub text: String,
    pub attrs: Vec<(String, String)>,
    pub visibility: Option<Visibility>,
    pub display: Display,
    pub has_box: bool,
}

impl TestLink {
    pub fn text(text: &str) -> Self {
        Self {
            tag: TagName::A,
            text: text.to_string(),
            attrs: vec![("href".to_string(), "#".to_string())],
            visibility: None,
            display: Display::Inline,
            has_box: true,
        }
    }

    pub fn tag(mut self, tag: TagName) -> Self {
        self.tag = tag;
        self.attrs.retain(|(name, _)| name != "href");
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visibility = Some(Visibility::Hidden);
        self
    }

    pub fn undisplayed(mut self) -> Self {
        self.display = Display::None;
        self
    }

    pub fn no_box(mut self) -> Self {
        self.has_box = false;
        self
    }
}

/// A page with the given links stacked vertically, in document order.
pub fn page_with_links(links: &[TestLink]) -> (MemoryPage, Vec<NodeId>) {
    let mut page = MemoryPage::new("https://example.com/list/1", 800, 600);
    page.set_content_size(800, 40 * links.len() as i32 + 600);
    let root = page.document.root;
    let ids = links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            let mut data =
                ElementData::new(link.tag.clone()).with_style(link.visibility, link.display);
            for (name, value) in &link.attrs {
                data.set_attribute(name, value);
            }
            if link.has_box {
                data = data.with_rect(10, 10 + 40 * i as i32, 120, 16);
            }
            let id = page.document.append_element(root, data);
            if !link.text.is_empty() {
                page.document.append_text(id, &link.text);
            }
            id
        })
        .collect();
    (page, ids)
}
