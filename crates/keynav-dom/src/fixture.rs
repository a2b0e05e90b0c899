//! Page fixtures: a TOML description of a laid-out page.
//!
//! ```toml
//! url = "https://example.com/list?page=1"
//! viewport = [1024, 768]
//! content = [1024, 4000]
//!
//! [[element]]
//! tag = "a"
//! text = "Next page"
//! rect = [20, 3900, 80, 16]
//! attrs = { href = "?page=2" }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use keynav_types::error::{KeynavError, Result};

use crate::dom::{Display, Document, ElementData, NodeId, TagName, Visibility};
use crate::memory::MemoryPage;

/// Top-level fixture file.
#[derive(Debug, Clone, Deserialize)]
pub struct PageFixture {
    pub url: String,
    #[serde(default = "default_viewport")]
    pub viewport: [i32; 2],
    /// Scrollable content size; defaults to the viewport.
    #[serde(default)]
    pub content: Option<[i32; 2]>,
    /// `id` attribute of the element focused on load.
    #[serde(default)]
    pub focused: Option<String>,
    /// Text selected on load.
    #[serde(default)]
    pub selection: Option<String>,
    #[serde(default, rename = "element")]
    pub elements: Vec<ElementFixture>,
}

/// One element and its subtree.
#[derive(Debug, Clone, Deserialize)]
pub struct ElementFixture {
    pub tag: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// `[x, y, w, h]` in document coordinates.
    #[serde(default)]
    pub rect: Option<[i32; 4]>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub children: Vec<ElementFixture>,
}

fn default_viewport() -> [i32; 2] {
    [1024, 768]
}

fn parse_visibility(s: &str) -> Result<Visibility> {
    match s {
        "visible" => Ok(Visibility::Visible),
        "hidden" => Ok(Visibility::Hidden),
        "collapse" => Ok(Visibility::Collapse),
        other => Err(KeynavError::Config(format!("unknown visibility {other:?}"))),
    }
}

fn parse_display(s: &str) -> Result<Display> {
    match s {
        "inline" => Ok(Display::Inline),
        "block" => Ok(Display::Block),
        "inline-block" => Ok(Display::InlineBlock),
        "none" => Ok(Display::None),
        other => Err(KeynavError::Config(format!("unknown display {other:?}"))),
    }
}

impl ElementFixture {
    fn build(&self, doc: &mut Document, parent: NodeId) -> Result<()> {
        let mut data = ElementData::new(TagName::from_str(&self.tag));
        for (name, value) in &self.attrs {
            data.set_attribute(name, value);
        }
        if let Some([x, y, w, h]) = self.rect {
            data = data.with_rect(x, y, w.max(0) as u32, h.max(0) as u32);
        }
        data.value = self.value.clone();
        data.style.visibility = self.visibility.as_deref().map(parse_visibility).transpose()?;
        if let Some(display) = self.display.as_deref() {
            data.style.display = parse_display(display)?;
        }

        let id = doc.append_element(parent, data);
        if let Some(text) = &self.text {
            doc.append_text(id, text);
        }
        for child in &self.children {
            child.build(doc, id)?;
        }
        Ok(())
    }
}

impl PageFixture {
    /// Parse a fixture from TOML.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| KeynavError::Config(format!("page fixture: {e}")))
    }

    /// Load a fixture file.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Build the in-memory page the fixture describes.
    pub fn into_page(self) -> Result<MemoryPage> {
        let mut doc = Document::new();
        let root = doc.root;
        for element in &self.elements {
            element.build(&mut doc, root)?;
        }

        let focused = match &self.focused {
            Some(dom_id) => Some(doc.get_element_by_id(dom_id).ok_or_else(|| {
                KeynavError::Dom(format!("focused element #{dom_id} not found"))
            })?),
            None => None,
        };

        let [vw, vh] = self.viewport;
        let mut page = MemoryPage::with_document(doc, &self.url, vw, vh);
        let [cw, ch] = self.content.unwrap_or(self.viewport);
        page.set_content_size(cw, ch);
        if let Some(id) = focused {
            page.focus(id);
        }
        if let Some(text) = &self.selection {
            page.set_selection(text);
        }
        log::debug!(
            "Built fixture page {} with {} nodes",
            self.url,
            page.document.nodes.len()
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Page, Window};

    const FIXTURE: &str = r#"
url = "https://example.com/list"
viewport = [800, 600]
content = [800, 2400]
focused = "q"
selection = "needle"

[[element]]
tag = "form"

  [[element.children]]
  tag = "input"
  rect = [10, 10, 200, 20]
  attrs = { id = "q", type = "search" }

[[element]]
tag = "a"
text = "Next page"
rect = [20, 2300, 80, 16]
attrs = { href = "?page=2" }

[[element]]
tag = "div"
text = "secret"
display = "none"
visibility = "hidden"
"#;

    #[test]
    fn fixture_builds_page() {
        let page = PageFixture::from_toml_str(FIXTURE)
            .unwrap()
            .into_page()
            .unwrap();
        assert_eq!(page.location(), "https://example.com/list");
        assert_eq!(page.scroll_state().content_height, 2400);
        assert_eq!(page.selection_text(), "needle");

        let inputs = page.text_input_elements();
        assert_eq!(inputs.len(), 1);
        assert_eq!(page.active_element(), Some(inputs[0]));
        assert_eq!(page.last_focused_input(), Some(inputs[0]));

        let links = page.clickable_elements();
        assert_eq!(links.len(), 1);
        assert_eq!(page.inner_text(links[0]).as_deref(), Some("Next page"));
    }

    #[test]
    fn style_strings_are_validated() {
        let bad = r#"
url = "https://example.com"
[[element]]
tag = "div"
display = "grid-ish"
"#;
        let err = PageFixture::from_toml_str(bad)
            .unwrap()
            .into_page()
            .unwrap_err();
        assert!(matches!(err, KeynavError::Config(_)));
    }

    #[test]
    fn missing_focus_target_is_dom_error() {
        let bad = r#"
url = "https://example.com"
focused = "nope"
"#;
        let err = PageFixture::from_toml_str(bad)
            .unwrap()
            .into_page()
            .unwrap_err();
        assert!(matches!(err, KeynavError::Dom(_)));
    }

    #[test]
    fn missing_url_is_config_error() {
        let err = PageFixture::from_toml_str("viewport = [1, 2]").unwrap_err();
        assert!(matches!(err, KeynavError::Config(_)));
    }
}
