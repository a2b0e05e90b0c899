//! Input focus cycler.
//!
//! Marks every visible text-like field with an overlay and lets Tab and
//! Shift-Tab step focus between them. Any other key ends the mode and is
//! handed on to whatever mode is underneath.

use keynav_dom::{NodeId, OverlayId, Page, Rect};
use keynav_types::input::{InputEvent, Key};

use crate::mode::InsertMode;

/// Notice shown when the page has nothing to focus.
pub const NO_INPUTS_NOTICE: &str = "There are no inputs to focus.";

/// How long [`NO_INPUTS_NOTICE`] stays up.
pub const NO_INPUTS_NOTICE_MS: u32 = 1000;

/// A visible field the cycler can focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusableElement {
    pub node: NodeId,
    pub tab_index: i32,
    /// Position among all text inputs, visible or not, in document order.
    pub dom_index: usize,
    /// Bounding rectangle in viewport coordinates.
    pub rect: Rect,
}

/// Visible text inputs in focus order.
///
/// Fields with a positive tab index come first, by tab index; the rest
/// follow in document order.
pub fn collect_focusable<P: Page + ?Sized>(page: &P) -> Vec<FocusableElement> {
    let mut elements: Vec<FocusableElement> = page
        .text_input_elements()
        .into_iter()
        .enumerate()
        .filter(|&(_, node)| page.visible_client_rect(node).is_some())
        .map(|(dom_index, node)| FocusableElement {
            node,
            tab_index: page.tab_index(node),
            dom_index,
            rect: page.bounding_rect(node),
        })
        .collect();
    elements.sort_by_key(|e| {
        let positive = e.tab_index > 0;
        (!positive, if positive { e.tab_index } else { 0 }, e.dom_index)
    });
    elements
}

/// Index of the field selected first.
///
/// A count of 1 resumes at the most recently focused input when it is
/// among `elements`; a larger count picks the `count`-th field, clamped to
/// the last one. `elements` must not be empty.
pub fn initial_index(
    elements: &[FocusableElement],
    count: u32,
    last_focused: Option<NodeId>,
) -> usize {
    if count <= 1 {
        last_focused
            .and_then(|node| elements.iter().position(|e| e.node == node))
            .unwrap_or(0)
    } else {
        (count as usize).min(elements.len()).saturating_sub(1)
    }
}

/// Marker placement: the element's box in document coordinates, nudged by
/// one pixel for the marker border.
pub fn marker_rect(rect: Rect, scroll: (i32, i32)) -> Rect {
    Rect::new(rect.x - 1 + scroll.0, rect.y - 1 + scroll.1, rect.w, rect.h)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclerState {
    Active { index: usize },
    Exited,
}

/// What happened to an event offered to the cycler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A cycle key moved the selection; the key must not reach the page.
    Suppressed,
    /// The cycler exited. With `restart_bubbling` set the event should be
    /// offered again to the modes below.
    Exited {
        handoff: Option<InsertMode>,
        restart_bubbling: bool,
    },
    /// The cycler did not act on the event.
    Ignored,
}

/// Result of starting the cycler.
#[derive(Debug)]
#[must_use = "an active cycler keeps its markers on the page until `exit` is called"]
pub enum Activation {
    /// Nothing to focus; the notice has not been shown yet.
    NoInputs,
    /// The cycler is running and owns its markers.
    Active(FocusCycler),
    /// A single field was focused and the cycler already exited.
    Finished(Option<InsertMode>),
}

/// The running focus cycler.
///
/// The markers belong to the page, not to this value: dropping a cycler
/// leaves them in place. Whoever holds it must call [`FocusCycler::exit`]
/// on every way out, including when the mode is replaced or torn down.
#[derive(Debug)]
#[must_use = "the cycler's markers stay on the page until `exit` is called"]
pub struct FocusCycler {
    elements: Vec<FocusableElement>,
    overlay: OverlayId,
    state: CyclerState,
}

impl FocusCycler {
    /// Collect fields, place markers, and focus the initial field.
    ///
    /// `count` and the page's last focused input choose the initial field.
    pub fn activate<P: Page + ?Sized>(page: &mut P, count: u32, scroll: (i32, i32)) -> Activation {
        let elements = collect_focusable(page);
        if elements.is_empty() {
            return Activation::NoInputs;
        }
        let index = initial_index(&elements, count, page.last_focused_input());
        let rects: Vec<Rect> = elements.iter().map(|e| marker_rect(e.rect, scroll)).collect();
        let overlay = page.create_overlay(&rects);
        page.simulate_select(elements[index].node);

        let mut cycler = FocusCycler {
            elements,
            overlay,
            state: CyclerState::Active { index },
        };
        if cycler.elements.len() == 1 {
            log::debug!("Single input, focus cycler exits at once");
            return Activation::Finished(cycler.exit(page));
        }
        page.set_marker_selected(overlay, index, true);
        log::info!(
            "Focus cycler active over {} inputs at index {index}",
            cycler.elements.len()
        );
        Activation::Active(cycler)
    }

    pub fn state(&self) -> CyclerState {
        self.state
    }

    pub fn elements(&self) -> &[FocusableElement] {
        &self.elements
    }

    pub fn overlay(&self) -> OverlayId {
        self.overlay
    }

    /// The currently selected field, `None` after exit.
    pub fn selected(&self) -> Option<NodeId> {
        match self.state {
            CyclerState::Active { index } => Some(self.elements[index].node),
            CyclerState::Exited => None,
        }
    }

    /// Offer an input event to the cycler.
    pub fn handle_event<P: Page + ?Sized>(
        &mut self,
        page: &mut P,
        event: &InputEvent,
    ) -> CycleOutcome {
        let CyclerState::Active { index } = self.state else {
            return CycleOutcome::Ignored;
        };
        match event {
            InputEvent::Key(key) if key.key == Key::Tab => {
                let len = self.elements.len();
                let next = if key.shift {
                    (index + len - 1) % len
                } else {
                    (index + 1) % len
                };
                page.set_marker_selected(self.overlay, index, false);
                page.set_marker_selected(self.overlay, next, true);
                page.simulate_select(self.elements[next].node);
                self.state = CyclerState::Active { index: next };
                CycleOutcome::Suppressed
            },
            InputEvent::Key(key) if key.is_bare_modifier() => CycleOutcome::Ignored,
            InputEvent::Key(_) => CycleOutcome::Exited {
                handoff: self.exit(page),
                restart_bubbling: true,
            },
            InputEvent::PointerClick { .. } => CycleOutcome::Exited {
                handoff: self.exit(page),
                restart_bubbling: false,
            },
        }
    }

    /// Leave the mode and remove every marker.
    ///
    /// Returns an insert mode for the focused element when it is editable.
    /// Calling this again after exit does nothing.
    pub fn exit<P: Page + ?Sized>(&mut self, page: &mut P) -> Option<InsertMode> {
        if self.state == CyclerState::Exited {
            return None;
        }
        self.state = CyclerState::Exited;
        page.remove_overlay(self.overlay);
        log::info!("Focus cycler exited");
        page.active_element()
            .filter(|&node| page.is_editable(node))
            .map(InsertMode::targeted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{input_row_page, page_with_inputs};
    use keynav_dom::{ElementData, MemoryPage, TagName, Window};
    use keynav_types::input::{KeyEvent, Modifier};

    fn tab() -> InputEvent {
        InputEvent::Key(KeyEvent::plain(Key::Tab))
    }

    fn shift_tab() -> InputEvent {
        InputEvent::Key(KeyEvent::shifted(Key::Tab))
    }

    fn active(page: &mut MemoryPage, count: u32) -> FocusCycler {
        let scroll = page.scroll_offset();
        match FocusCycler::activate(page, count, scroll) {
            Activation::Active(cycler) => cycler,
            other => panic!("expected active cycler, got {other:?}"),
        }
    }

    #[test]
    fn one_marker_per_visible_input() {
        let (mut page, inputs) = input_row_page(4);
        let cycler = active(&mut page, 1);
        assert_eq!(page.marker_count(), 4);
        assert_eq!(cycler.elements().len(), 4);
        assert_eq!(cycler.selected(), Some(inputs[0]));
        assert_eq!(page.active_element(), Some(inputs[0]));
        let markers = page.markers(cycler.overlay()).unwrap();
        assert!(markers[0].selected);
        assert!(markers[1..].iter().all(|m| !m.selected));
    }

    #[test]
    fn markers_sit_one_pixel_outside_the_element() {
        let (mut page, _) = input_row_page(2);
        page.scroll_to(keynav_dom::Axis::Y, keynav_dom::ScrollTarget::Offset(5));
        let cycler = active(&mut page, 1);
        let markers = page.markers(cycler.overlay()).unwrap();
        // The first input sits at (10, 10) in document coordinates.
        assert_eq!(markers[0].rect, Rect::new(9, 9, 100, 20));
    }

    #[test]
    fn tab_wraps_forward_and_backward() {
        let (mut page, inputs) = input_row_page(3);
        let mut cycler = active(&mut page, 1);

        assert_eq!(cycler.handle_event(&mut page, &shift_tab()), CycleOutcome::Suppressed);
        assert_eq!(cycler.selected(), Some(inputs[2]));
        assert_eq!(page.active_element(), Some(inputs[2]));

        for _ in 0..3 {
            assert_eq!(cycler.handle_event(&mut page, &tab()), CycleOutcome::Suppressed);
        }
        assert_eq!(cycler.selected(), Some(inputs[2]));
        let markers = page.markers(cycler.overlay()).unwrap();
        assert_eq!(markers.iter().filter(|m| m.selected).count(), 1);
        assert!(markers[2].selected);
    }

    #[test]
    fn count_picks_nth_input_clamped() {
        let (mut page, inputs) = input_row_page(3);
        let cycler = active(&mut page, 2);
        assert_eq!(cycler.selected(), Some(inputs[1]));
        let mut page2 = input_row_page(3).0;
        let cycler = active(&mut page2, 99);
        assert_eq!(cycler.selected(), Some(inputs[2]));
    }

    #[test]
    fn count_one_resumes_last_focused() {
        let (mut page, inputs) = input_row_page(3);
        page.focus(inputs[1]);
        page.blur();
        let cycler = active(&mut page, 1);
        assert_eq!(cycler.selected(), Some(inputs[1]));
    }

    #[test]
    fn other_key_exits_with_handoff() {
        let (mut page, inputs) = input_row_page(2);
        let mut cycler = active(&mut page, 1);
        let outcome = cycler.handle_event(&mut page, &InputEvent::Key(KeyEvent::char('x')));
        assert_eq!(
            outcome,
            CycleOutcome::Exited {
                handoff: Some(InsertMode::targeted(inputs[0])),
                restart_bubbling: true,
            }
        );
        assert_eq!(page.marker_count(), 0);
        assert_eq!(cycler.state(), CyclerState::Exited);
        assert_eq!(cycler.handle_event(&mut page, &tab()), CycleOutcome::Ignored);
    }

    #[test]
    fn bare_modifiers_do_not_exit() {
        let (mut page, _) = input_row_page(2);
        let mut cycler = active(&mut page, 1);
        for modifier in [Modifier::Shift, Modifier::Control] {
            let event = InputEvent::Key(KeyEvent::plain(Key::Modifier(modifier)));
            assert_eq!(cycler.handle_event(&mut page, &event), CycleOutcome::Ignored);
        }
        assert_eq!(page.marker_count(), 2);
    }

    #[test]
    fn click_exits_without_restart() {
        let (mut page, _) = input_row_page(2);
        let mut cycler = active(&mut page, 1);
        page.blur();
        let outcome = cycler.handle_event(&mut page, &InputEvent::PointerClick { x: 0, y: 0 });
        assert_eq!(
            outcome,
            CycleOutcome::Exited {
                handoff: None,
                restart_bubbling: false,
            }
        );
        assert_eq!(page.overlay_count(), 0);
    }

    #[test]
    fn every_exit_path_removes_markers() {
        let exits: [fn(&mut FocusCycler, &mut MemoryPage); 3] = [
            |c, page| {
                c.handle_event(page, &InputEvent::Key(KeyEvent::char('x')));
            },
            |c, page| {
                c.handle_event(page, &InputEvent::PointerClick { x: 700, y: 500 });
            },
            |c, page| {
                c.exit(page);
            },
        ];
        for exit in exits {
            let (mut page, _) = input_row_page(3);
            let mut cycler = active(&mut page, 1);
            assert_eq!(page.marker_count(), 3);
            exit(&mut cycler, &mut page);
            assert_eq!(cycler.state(), CyclerState::Exited);
            assert_eq!(page.marker_count(), 0);
            assert_eq!(page.overlay_count(), 0);
        }
    }

    #[test]
    fn exit_is_idempotent() {
        let (mut page, _) = input_row_page(2);
        let mut cycler = active(&mut page, 1);
        assert!(cycler.exit(&mut page).is_some());
        assert!(cycler.exit(&mut page).is_none());
        assert_eq!(page.overlay_count(), 0);
    }

    #[test]
    fn single_input_is_focused_and_exits() {
        let (mut page, inputs) = input_row_page(1);
        let scroll = page.scroll_offset();
        match FocusCycler::activate(&mut page, 1, scroll) {
            Activation::Finished(handoff) => {
                assert_eq!(handoff, Some(InsertMode::targeted(inputs[0])));
            },
            other => panic!("expected finished, got {other:?}"),
        }
        assert_eq!(page.active_element(), Some(inputs[0]));
        assert_eq!(page.overlay_count(), 0);
    }

    #[test]
    fn no_inputs() {
        let mut page = MemoryPage::new("https://example.com", 800, 600);
        assert!(matches!(
            FocusCycler::activate(&mut page, 1, (0, 0)),
            Activation::NoInputs
        ));
        assert_eq!(page.overlay_count(), 0);
    }

    #[test]
    fn positive_tab_index_first() {
        let (page, inputs) = page_with_inputs(&[
            ("text", 0),
            ("text", 2),
            ("search", 0),
            ("text", 1),
            ("email", 2),
        ]);
        let order: Vec<_> = collect_focusable(&page).iter().map(|e| e.node).collect();
        assert_eq!(order, vec![inputs[3], inputs[1], inputs[4], inputs[0], inputs[2]]);
    }

    #[test]
    fn invisible_and_disabled_inputs_skipped() {
        let mut page = MemoryPage::new("https://example.com", 800, 600);
        let root = page.document.root;
        let shown = page.document.append_element(
            root,
            ElementData::new(TagName::Input).with_rect(10, 10, 100, 20),
        );
        page.document.append_element(
            root,
            ElementData::new(TagName::Input)
                .with_attr("disabled", "")
                .with_rect(10, 40, 100, 20),
        );
        page.document.append_element(
            root,
            ElementData::new(TagName::Input)
                .with_attr("type", "checkbox")
                .with_rect(10, 70, 100, 20),
        );
        page.document
            .append_element(root, ElementData::new(TagName::Textarea));
        let editable = page.document.append_element(
            root,
            ElementData::new(TagName::Div)
                .with_attr("contenteditable", "TRUE")
                .with_rect(10, 100, 100, 20),
        );
        let found: Vec<_> = collect_focusable(&page).iter().map(|e| e.node).collect();
        assert_eq!(found, vec![shown, editable]);
        // The textarea without a box still counts towards dom_index.
        assert_eq!(collect_focusable(&page)[1].dom_index, 2);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn n_forward_steps_return_to_start(n in 2usize..12, start in 1u32..12) {
                let (mut page, _) = input_row_page(n);
                let mut cycler = active(&mut page, start);
                let first = cycler.selected();
                for _ in 0..n {
                    let outcome = cycler.handle_event(&mut page, &tab());
                    prop_assert_eq!(outcome, CycleOutcome::Suppressed);
                }
                prop_assert_eq!(cycler.selected(), first);
                prop_assert_eq!(page.marker_count(), n);
            }

            #[test]
            fn backward_from_zero_lands_on_last(n in 2usize..12) {
                let (mut page, inputs) = input_row_page(n);
                let mut cycler = active(&mut page, 1);
                cycler.handle_event(&mut page, &shift_tab());
                prop_assert_eq!(cycler.selected(), Some(inputs[n - 1]));
            }

            #[test]
            fn initial_index_in_range(n in 1usize..20, count in 1u32..50) {
                let (page, _) = input_row_page(n);
                let elements = collect_focusable(&page);
                let idx = initial_index(&elements, count, None);
                prop_assert!(idx < n);
            }
        }
    }
}
