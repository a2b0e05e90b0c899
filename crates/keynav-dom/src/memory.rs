//! In-memory page: a [`Document`] plus the window state around it.
//!
//! Used by tests and by the demo binary. Interaction is simulated
//! faithfully enough for navigation logic: clicks on hyperlinks navigate,
//! selecting an element focuses it, and overlays are tracked so callers can
//! assert that markers were created and removed.

use std::collections::BTreeMap;

use crate::dom::{ComputedStyle, Document, NodeId, Rect, TagName, Visibility};
use crate::history::History;
use crate::page::{Marker, OverlayId, Page, Window};
use crate::scroll::{Axis, ScrollAmount, ScrollState, ScrollTarget};

/// A page held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryPage {
    pub document: Document,
    scroll: ScrollState,
    history: History,
    focused: Option<NodeId>,
    last_focused_input: Option<NodeId>,
    overlays: BTreeMap<OverlayId, Vec<Marker>>,
    next_overlay: u32,
    clicks: Vec<NodeId>,
    previous_position: Option<(i32, i32)>,
    selection: String,
}

impl MemoryPage {
    /// Create a page at `url` with an empty document.
    pub fn new(url: &str, viewport_width: i32, viewport_height: i32) -> Self {
        Self::with_document(Document::new(), url, viewport_width, viewport_height)
    }

    /// Wrap an existing document.
    pub fn with_document(
        document: Document,
        url: &str,
        viewport_width: i32,
        viewport_height: i32,
    ) -> Self {
        Self {
            document,
            scroll: ScrollState::new(viewport_width, viewport_height),
            history: History::new(url),
            focused: None,
            last_focused_input: None,
            overlays: BTreeMap::new(),
            next_overlay: 1,
            clicks: Vec::new(),
            previous_position: None,
            selection: String::new(),
        }
    }

    /// Set the scrollable content size.
    pub fn set_content_size(&mut self, width: i32, height: i32) {
        self.scroll.set_content_size(width, height);
    }

    /// Move focus without selecting (as a mouse click into a field would).
    pub fn focus(&mut self, id: NodeId) {
        self.focused = Some(id);
        if self.document.element(id).is_some_and(|e| e.is_text_input()) {
            self.last_focused_input = Some(id);
        }
    }

    /// Drop focus.
    pub fn blur(&mut self) {
        self.focused = None;
    }

    pub fn set_selection(&mut self, text: &str) {
        self.selection = text.to_string();
    }

    /// Elements clicked so far, oldest first.
    pub fn clicks(&self) -> &[NodeId] {
        &self.clicks
    }

    /// Number of overlays currently attached.
    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    /// Total markers across all attached overlays.
    pub fn marker_count(&self) -> usize {
        self.overlays.values().map(Vec::len).sum()
    }

    /// Markers of one overlay, in creation order.
    pub fn markers(&self, overlay: OverlayId) -> Option<&[Marker]> {
        self.overlays.get(&overlay).map(Vec::as_slice)
    }

    pub fn previous_position(&self) -> Option<(i32, i32)> {
        self.previous_position
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn scroll_state(&self) -> &ScrollState {
        &self.scroll
    }

    fn viewport(&self) -> Rect {
        Rect::new(
            0,
            0,
            self.scroll.viewport_width.max(0) as u32,
            self.scroll.viewport_height.max(0) as u32,
        )
    }
}

/// Resolve `href` against `base` (absolute, root-relative, or relative).
pub fn resolve_url(base: &str, href: &str) -> String {
    if href.contains("://") || href.starts_with("view-source:") {
        return href.to_string();
    }
    let origin_end = base
        .find("://")
        .map(|i| i + 3)
        .and_then(|start| base[start..].find('/').map(|j| start + j))
        .unwrap_or(base.len());
    if href.starts_with('/') {
        return format!("{}{}", &base[..origin_end], href);
    }
    let dir_end = base[origin_end..]
        .rfind('/')
        .map(|i| origin_end + i + 1)
        .unwrap_or(base.len());
    if dir_end == base.len() && !base.ends_with('/') {
        format!("{base}/{href}")
    } else {
        format!("{}{}", &base[..dir_end], href)
    }
}

/// Intersection of two rectangles, `None` if they do not overlap.
fn intersect(a: Rect, b: Rect) -> Option<Rect> {
    let left = a.x.max(b.x);
    let top = a.y.max(b.y);
    let right = (a.x + a.w as i32).min(b.x + b.w as i32);
    let bottom = (a.y + a.h as i32).min(b.y + b.h as i32);
    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect::new(left, top, (right - left) as u32, (bottom - top) as u32))
}

impl Page for MemoryPage {
    fn clickable_elements(&self) -> Vec<NodeId> {
        self.document.query(|e| e.is_clickable())
    }

    fn text_input_elements(&self) -> Vec<NodeId> {
        self.document.query(|e| e.is_text_input())
    }

    fn elements_by_tag(&self, tag: &TagName) -> Vec<NodeId> {
        self.document.query(|e| e.tag == *tag)
    }

    fn tag_name(&self, id: NodeId) -> Option<TagName> {
        self.document.element(id).map(|e| e.tag.clone())
    }

    fn attribute(&self, id: NodeId, name: &str) -> Option<String> {
        self.document
            .element(id)
            .and_then(|e| e.get_attribute(name))
            .map(str::to_string)
    }

    fn inner_text(&self, id: NodeId) -> Option<String> {
        let element = self.document.element(id)?;
        if element.tag == TagName::Svg {
            return None;
        }
        Some(self.document.text_content(id))
    }

    fn form_value(&self, id: NodeId) -> Option<String> {
        self.document.element(id).and_then(|e| e.value.clone())
    }

    fn computed_style(&self, id: NodeId) -> ComputedStyle {
        self.document.computed_style(id)
    }

    fn bounding_rect(&self, id: NodeId) -> Rect {
        let (sx, sy) = self.scroll_offset();
        self.document
            .element(id)
            .and_then(|e| e.rect)
            .unwrap_or_default()
            .translate(-sx, -sy)
    }

    fn visible_client_rect(&self, id: NodeId) -> Option<Rect> {
        let element = self.document.element(id)?;
        if self.document.in_undisplayed_subtree(id)
            || self.document.computed_style(id).visibility != Visibility::Visible
        {
            return None;
        }
        let rect = element.rect?;
        if rect.is_empty() {
            return None;
        }
        let (sx, sy) = self.scroll_offset();
        intersect(rect.translate(-sx, -sy), self.viewport())
    }

    fn tab_index(&self, id: NodeId) -> i32 {
        self.document.element(id).map_or(0, |e| e.tab_index())
    }

    fn active_element(&self) -> Option<NodeId> {
        self.focused
    }

    fn last_focused_input(&self) -> Option<NodeId> {
        self.last_focused_input
    }

    fn is_editable(&self, id: NodeId) -> bool {
        self.document.element(id).is_some_and(|e| e.is_editable())
    }

    fn simulate_click(&mut self, id: NodeId) {
        self.clicks.push(id);
        let target = self
            .document
            .element(id)
            .filter(|e| e.tag == TagName::A)
            .and_then(|e| e.href())
            .filter(|href| !href.starts_with('#') && !href.starts_with("javascript:"))
            .map(|href| resolve_url(self.history.current_url(), href));
        if let Some(url) = target {
            log::debug!("Click on node {id} follows {url}");
            self.history.navigate(&url);
        }
    }

    fn simulate_select(&mut self, id: NodeId) {
        self.focus(id);
    }

    fn scroll_into_view(&mut self, id: NodeId) {
        if let Some(rect) = self.document.element(id).and_then(|e| e.rect) {
            self.scroll.scroll_to_visible(rect.y, rect.h as i32);
        }
    }

    fn create_overlay(&mut self, rects: &[Rect]) -> OverlayId {
        let id = OverlayId(self.next_overlay);
        self.next_overlay += 1;
        let markers = rects
            .iter()
            .map(|&rect| Marker {
                rect,
                selected: false,
            })
            .collect();
        self.overlays.insert(id, markers);
        id
    }

    fn set_marker_selected(&mut self, overlay: OverlayId, index: usize, selected: bool) {
        if let Some(marker) = self
            .overlays
            .get_mut(&overlay)
            .and_then(|markers| markers.get_mut(index))
        {
            marker.selected = selected;
        }
    }

    fn remove_overlay(&mut self, overlay: OverlayId) {
        self.overlays.remove(&overlay);
    }
}

impl Window for MemoryPage {
    fn scroll_to(&mut self, axis: Axis, target: ScrollTarget) {
        self.scroll.scroll_to(axis, target);
    }

    fn scroll_by(&mut self, axis: Axis, amount: ScrollAmount) {
        self.scroll.scroll_by(axis, amount);
    }

    fn scroll_offset(&self) -> (i32, i32) {
        (self.scroll.scroll_x, self.scroll.scroll_y)
    }

    fn record_previous_position(&mut self) {
        self.previous_position = Some(self.scroll_offset());
    }

    fn history_go(&mut self, delta: i32) {
        self.history.go(delta);
    }

    fn location(&self) -> String {
        self.history.current_url().to_string()
    }

    fn set_location(&mut self, url: &str) {
        self.history.navigate(url);
    }

    fn selection_text(&self) -> String {
        self.selection.clone()
    }
}
