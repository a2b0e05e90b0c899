//! Viewport and scroll offset management.

/// Scroll axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Absolute scroll destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollTarget {
    /// A pixel offset from the start of the content.
    Offset(i32),
    /// The far end of the content.
    Max,
}

/// Relative scroll distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollAmount {
    /// A fixed number of pixels (negative scrolls up/left).
    Pixels(i32),
    /// A multiple of the viewport size along the axis.
    ViewSize(f32),
}

/// Scroll state for a page viewport, in both axes.
#[derive(Debug, Clone)]
pub struct ScrollState {
    pub scroll_x: i32,
    pub scroll_y: i32,
    pub content_width: i32,
    pub content_height: i32,
    pub viewport_width: i32,
    pub viewport_height: i32,
}

impl ScrollState {
    pub fn new(viewport_width: i32, viewport_height: i32) -> Self {
        Self {
            scroll_x: 0,
            scroll_y: 0,
            content_width: viewport_width,
            content_height: viewport_height,
            viewport_width,
            viewport_height,
        }
    }

    /// Set the scrollable content size and re-clamp the offsets.
    pub fn set_content_size(&mut self, width: i32, height: i32) {
        self.content_width = width;
        self.content_height = height;
        self.clamp();
    }

    /// Current offset along `axis`.
    pub fn offset(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.scroll_x,
            Axis::Y => self.scroll_y,
        }
    }

    /// Largest valid offset along `axis`.
    pub fn max_offset(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => (self.content_width - self.viewport_width).max(0),
            Axis::Y => (self.content_height - self.viewport_height).max(0),
        }
    }

    fn view_size(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.viewport_width,
            Axis::Y => self.viewport_height,
        }
    }

    /// Scroll to an absolute position.
    pub fn scroll_to(&mut self, axis: Axis, target: ScrollTarget) {
        let value = match target {
            ScrollTarget::Offset(v) => v,
            ScrollTarget::Max => self.max_offset(axis),
        };
        self.set_offset(axis, value);
    }

    /// Scroll by a relative amount.
    pub fn scroll_by(&mut self, axis: Axis, amount: ScrollAmount) {
        let delta = match amount {
            ScrollAmount::Pixels(px) => px,
            ScrollAmount::ViewSize(factor) => (self.view_size(axis) as f32 * factor) as i32,
        };
        let current = self.offset(axis);
        self.set_offset(axis, current.saturating_add(delta));
    }

    /// Scroll to make a rectangle visible.
    /// Centers it in the viewport if it is offscreen.
    pub fn scroll_to_visible(&mut self, target_y: i32, target_height: i32) {
        let visible_top = self.scroll_y;
        let visible_bottom = self.scroll_y + self.viewport_height;

        if target_y >= visible_top && target_y + target_height <= visible_bottom {
            return;
        }

        let center = target_y + target_height / 2;
        self.scroll_y = center - self.viewport_height / 2;
        self.clamp();
    }

    fn set_offset(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::X => self.scroll_x = value,
            Axis::Y => self.scroll_y = value,
        }
        self.clamp();
    }

    /// Clamp offsets to `[0, max]`.
    fn clamp(&mut self) {
        self.scroll_x = self.scroll_x.clamp(0, self.max_offset(Axis::X));
        self.scroll_y = self.scroll_y.clamp(0, self.max_offset(Axis::Y));
    }
}
