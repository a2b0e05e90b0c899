//! The page services normal mode consumes.
//!
//! [`Page`] is the DOM query service: structural queries in document order,
//! visibility, geometry, simulated interaction, and marker overlays.
//! [`Window`] covers the frame-level state around the document: scrolling,
//! history, location, and selection. Hosts implement both; [`Frame`] is the
//! combined object handed to command handlers.

use crate::dom::{ComputedStyle, NodeId, Rect, TagName};
use crate::scroll::{Axis, ScrollAmount, ScrollTarget};

/// Handle to a group of markers created together. Ordered by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverlayId(pub u32);

/// A single marker inside an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    /// Position and size in document coordinates.
    pub rect: Rect,
    /// Whether the marker is drawn as the current selection.
    pub selected: bool,
}

/// DOM query and manipulation service.
pub trait Page {
    /// Hyperlinks plus elements with a click handler, link role, or
    /// button class, in document order.
    fn clickable_elements(&self) -> Vec<NodeId>;

    /// Text-like inputs, text areas, and content-editable elements, in
    /// document order.
    fn text_input_elements(&self) -> Vec<NodeId>;

    /// Elements with the given tag, in document order.
    fn elements_by_tag(&self, tag: &TagName) -> Vec<NodeId>;

    fn tag_name(&self, id: NodeId) -> Option<TagName>;

    fn attribute(&self, id: NodeId, name: &str) -> Option<String>;

    /// Rendered text. `None` for elements without a text rendering (SVG).
    fn inner_text(&self, id: NodeId) -> Option<String>;

    /// Form value, if the element has one.
    fn form_value(&self, id: NodeId) -> Option<String>;

    fn computed_style(&self, id: NodeId) -> ComputedStyle;

    /// Bounding rectangle in viewport coordinates (may be empty).
    fn bounding_rect(&self, id: NodeId) -> Rect;

    /// Viewport rectangle of the element if it is actually rendered and
    /// visible; `None` otherwise.
    fn visible_client_rect(&self, id: NodeId) -> Option<Rect>;

    /// Explicit tab order (0 when unset).
    fn tab_index(&self, id: NodeId) -> i32;

    /// The element that currently has focus.
    fn active_element(&self) -> Option<NodeId>;

    /// The text input that most recently held focus.
    fn last_focused_input(&self) -> Option<NodeId>;

    /// Whether typing into the element edits it.
    fn is_editable(&self, id: NodeId) -> bool;

    fn simulate_click(&mut self, id: NodeId);

    /// Focus the element and select its contents.
    fn simulate_select(&mut self, id: NodeId);

    fn scroll_into_view(&mut self, id: NodeId);

    /// Insert one marker per rectangle as a single overlay.
    fn create_overlay(&mut self, rects: &[Rect]) -> OverlayId;

    /// Toggle the selected look of the `index`-th marker of an overlay.
    fn set_marker_selected(&mut self, overlay: OverlayId, index: usize, selected: bool);

    /// Remove an overlay and all of its markers. Unknown ids are ignored.
    fn remove_overlay(&mut self, overlay: OverlayId);
}

/// Frame-level state: viewport, history, location, selection.
pub trait Window {
    fn scroll_to(&mut self, axis: Axis, target: ScrollTarget);

    fn scroll_by(&mut self, axis: Axis, amount: ScrollAmount);

    /// Current `(x, y)` scroll offsets.
    fn scroll_offset(&self) -> (i32, i32);

    /// Remember the current position so it can be jumped back to.
    fn record_previous_position(&mut self);

    /// Traverse session history by `delta` entries.
    fn history_go(&mut self, delta: i32);

    fn location(&self) -> String;

    fn set_location(&mut self, url: &str);

    /// Currently selected text (empty if none).
    fn selection_text(&self) -> String;
}

/// A frame exposes both the DOM and its window.
pub trait Frame: Page + Window {}

impl<T: Page + Window> Frame for T {}
