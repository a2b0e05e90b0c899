//! Arena-based DOM tree with the layout facts normal mode needs.
//!
//! Nodes are stored in a flat `Vec` arena and linked by index. Each element
//! carries its attributes plus the style and layout box a rendering engine
//! would have computed, so queries such as "is this link hidden" can be
//! answered without a layout pass.

/// Index into the [`Document`]'s node arena.
pub type NodeId = usize;

// ------------------------------------------------------------------
// Geometry and style
// ------------------------------------------------------------------

/// An axis-aligned rectangle in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// `true` if the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// `true` if the point lies inside the rectangle.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && py >= self.y && px < self.x + self.w as i32 && py < self.y + self.h as i32
    }

    /// Shift the rectangle by `(dx, dy)`.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// CSS `visibility`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

/// CSS `display`, reduced to what matters for hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Inline,
    Block,
    InlineBlock,
    None,
}

/// Declared style of an element.
///
/// `visibility` inherits (a `None` defers to the parent); `display` does
/// not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub visibility: Option<Visibility>,
    pub display: Display,
}

/// Style after inheritance, as `getComputedStyle` would report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputedStyle {
    pub visibility: Visibility,
    pub display: Display,
}

impl ComputedStyle {
    /// Hidden for the purposes of link matching.
    pub fn is_hidden(&self) -> bool {
        self.visibility != Visibility::Visible || self.display == Display::None
    }
}

// ------------------------------------------------------------------
// Node types
// ------------------------------------------------------------------

/// The root of a page's document.
#[derive(Debug, Clone)]
pub struct Document {
    pub nodes: Vec<Node>,
    pub root: NodeId,
}

/// A single node in the DOM tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// The kind of DOM node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
}

/// An element attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Data associated with an Element node.
#[derive(Debug, Clone)]
pub struct ElementData {
    pub tag: TagName,
    pub attributes: Vec<Attribute>,
    pub style: Style,
    /// Layout box in document coordinates; `None` if the element produced
    /// no box.
    pub rect: Option<Rect>,
    /// Current form value (`<input>`, `<textarea>`, `<button>`).
    pub value: Option<String>,
}

// ------------------------------------------------------------------
// TagName
// ------------------------------------------------------------------

/// Tag names the navigation queries distinguish.
///
/// Everything else is kept as `Unknown(String)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagName {
    Html,
    Head,
    Body,
    Link,
    A,
    Area,
    Div,
    Span,
    P,
    Form,
    Input,
    Textarea,
    Select,
    Button,
    Svg,
    Unknown(String),
}

impl TagName {
    /// Parse a tag name, ignoring ASCII case.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "html" => Self::Html,
            "head" => Self::Head,
            "body" => Self::Body,
            "link" => Self::Link,
            "a" => Self::A,
            "area" => Self::Area,
            "div" => Self::Div,
            "span" => Self::Span,
            "p" => Self::P,
            "form" => Self::Form,
            "input" => Self::Input,
            "textarea" => Self::Textarea,
            "select" => Self::Select,
            "button" => Self::Button,
            "svg" => Self::Svg,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Get the string representation of this tag name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Html => "html",
            Self::Head => "head",
            Self::Body => "body",
            Self::Link => "link",
            Self::A => "a",
            Self::Area => "area",
            Self::Div => "div",
            Self::Span => "span",
            Self::P => "p",
            Self::Form => "form",
            Self::Input => "input",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Button => "button",
            Self::Svg => "svg",
            Self::Unknown(s) => s.as_str(),
        }
    }
}

// ------------------------------------------------------------------
// ElementData
// ------------------------------------------------------------------

/// `<input type>` values treated as text fields.
pub const TEXT_INPUT_TYPES: &[&str] = &[
    "text", "search", "email", "url", "number", "password", "date", "tel",
];

impl ElementData {
    /// Create a new `ElementData` with the given tag and no attributes.
    pub fn new(tag: TagName) -> Self {
        Self {
            tag,
            attributes: Vec::new(),
            style: Style::default(),
            rect: None,
            value: None,
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder-style layout box setter.
    pub fn with_rect(mut self, x: i32, y: i32, w: u32, h: u32) -> Self {
        self.rect = Some(Rect::new(x, y, w, h));
        self
    }

    /// Builder-style form value setter.
    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    /// Builder-style style setter.
    pub fn with_style(mut self, visibility: Option<Visibility>, display: Display) -> Self {
        self.style = Style {
            visibility,
            display,
        };
        self
    }

    /// Set or replace an attribute. Names are stored lowercased.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if let Some(attr) = self.attributes.iter_mut().find(|a| a.name == name) {
            attr.value = value.to_string();
        } else {
            self.attributes.push(Attribute {
                name,
                value: value.to_string(),
            });
        }
    }

    /// Get an attribute value by name (case-insensitive lookup).
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// `true` if the attribute is present, whatever its value.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    /// Get the `id` attribute if present.
    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }

    /// Get the `href` attribute if present (for links).
    pub fn href(&self) -> Option<&str> {
        self.get_attribute("href")
    }

    /// Explicit tab order; absent or malformed `tabindex` reads as 0.
    pub fn tab_index(&self) -> i32 {
        self.get_attribute("tabindex")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Hyperlinks and elements that carry a click handler, a link role, or
    /// a button-ish class.
    pub fn is_clickable(&self) -> bool {
        self.tag == TagName::A
            || self.has_attribute("onclick")
            || self.get_attribute("role") == Some("link")
            || self
                .get_attribute("class")
                .is_some_and(|c| c.contains("button"))
    }

    /// `contenteditable` is empty or `true` (any case).
    pub fn is_content_editable(&self) -> bool {
        self.get_attribute("contenteditable")
            .is_some_and(|v| v.is_empty() || v.eq_ignore_ascii_case("true"))
    }

    /// Text-like form fields, text areas, and content-editable elements.
    pub fn is_text_input(&self) -> bool {
        match self.tag {
            TagName::Input => {
                let type_ok = match self.get_attribute("type") {
                    None => true,
                    Some(t) => TEXT_INPUT_TYPES.contains(&t),
                };
                type_ok && !self.has_attribute("disabled") && !self.has_attribute("readonly")
            },
            TagName::Textarea => true,
            _ => self.is_content_editable(),
        }
    }

    /// Elements that accept typed text once focused.
    pub fn is_editable(&self) -> bool {
        self.is_text_input() || self.tag == TagName::Select
    }
}

// ------------------------------------------------------------------
// Document
// ------------------------------------------------------------------

impl Document {
    /// Create an empty document with a synthetic `Document` root node.
    pub fn new() -> Self {
        let root_node = Node {
            kind: NodeKind::Document,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root_node],
            root: 0,
        }
    }

    /// Add a new node to the arena and return its [`NodeId`].
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Append `child_id` as the last child of `parent_id`.
    pub fn append_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        self.nodes[parent_id].children.push(child_id);
        self.nodes[child_id].parent = Some(parent_id);
    }

    /// Create an element and append it under `parent`.
    pub fn append_element(&mut self, parent: NodeId, data: ElementData) -> NodeId {
        let id = self.add_node(NodeKind::Element(data));
        self.append_child(parent, id);
        id
    }

    /// Create a text node and append it under `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.add_node(NodeKind::Text(text.to_string()));
        self.append_child(parent, id);
        id
    }

    /// Get a reference to a node by ID.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Get the [`ElementData`] for a node, if it is an `Element`.
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.nodes.get(id).map(|n| &n.kind) {
            Some(NodeKind::Element(data)) => Some(data),
            _ => None,
        }
    }

    /// Mutable access to an element's data.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.nodes.get_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Element(data)) => Some(data),
            _ => None,
        }
    }

    /// Get the concatenated text content of a node and all its
    /// descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id].kind {
            NodeKind::Text(s) => out.push_str(s),
            _ => {
                for &child in &self.nodes[id].children {
                    self.collect_text(child, out);
                }
            },
        }
    }

    /// All element ids in document (pre-order) order.
    pub fn elements_in_order(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if matches!(self.nodes[id].kind, NodeKind::Element(_)) {
                out.push(id);
            }
            stack.extend(self.nodes[id].children.iter().rev());
        }
        out
    }

    /// Elements in document order that satisfy `pred`.
    pub fn query(&self, pred: impl Fn(&ElementData) -> bool) -> Vec<NodeId> {
        self.elements_in_order()
            .into_iter()
            .filter(|&id| self.element(id).is_some_and(&pred))
            .collect()
    }

    /// Find the first element whose `id` attribute matches `target`.
    pub fn get_element_by_id(&self, target: &str) -> Option<NodeId> {
        self.elements_in_order()
            .into_iter()
            .find(|&id| self.element(id).and_then(|e| e.id()) == Some(target))
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes[id].parent, move |&p| self.nodes[p].parent)
    }

    /// Resolve inherited visibility and own display for an element.
    pub fn computed_style(&self, id: NodeId) -> ComputedStyle {
        let own = self.element(id).map(|e| e.style).unwrap_or_default();
        let visibility = std::iter::once(id)
            .chain(self.ancestors(id))
            .find_map(|n| self.element(n).and_then(|e| e.style.visibility))
            .unwrap_or_default();
        ComputedStyle {
            visibility,
            display: own.display,
        }
    }

    /// `true` if the element or any ancestor has `display: none`.
    pub fn in_undisplayed_subtree(&self, id: NodeId) -> bool {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .any(|n| self.element(n).is_some_and(|e| e.style.display == Display::None))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------
