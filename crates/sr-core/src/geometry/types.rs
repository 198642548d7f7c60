/// A point in root-window (screen) coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Rectangle in screen coordinates, origin top-left.
///
/// Width and height may be negative while a drag is in progress; the sign
/// gives the drag direction. Call [`Rect::normalized`] before handing the
/// rectangle to anything that draws or captures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle spanned from `anchor` to `corner`, keeping the drag sign
    pub fn from_corners(anchor: Point, corner: Point) -> Self {
        Self {
            x: anchor.x,
            y: anchor.y,
            w: corner.x - anchor.x,
            h: corner.y - anchor.y,
        }
    }

    /// Flip negative extents so that `w` and `h` are non-negative
    pub fn normalized(self) -> Self {
        let (x, w) = if self.w < 0 {
            (self.x.saturating_add(self.w), self.w.saturating_neg())
        } else {
            (self.x, self.w)
        };
        let (y, h) = if self.h < 0 {
            (self.y.saturating_add(self.h), self.h.saturating_neg())
        } else {
            (self.y, self.h)
        };
        Self { x, y, w, h }
    }

    /// True when there is nothing to capture
    pub fn is_degenerate(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Half-open containment: the right and bottom edges are outside
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x.saturating_add(self.w)
            && point.y < self.y.saturating_add(self.h)
    }

    /// Grow the rectangle by `amount` on every side
    pub fn expand(self, amount: i32) -> Self {
        Self {
            x: self.x.saturating_sub(amount),
            y: self.y.saturating_sub(amount),
            w: self.w.saturating_add(amount.saturating_mul(2)),
            h: self.h.saturating_add(amount.saturating_mul(2)),
        }
    }
}

/// Dimensions of the primary display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenInfo {
    pub width: i32,
    pub height: i32,
}

impl ScreenInfo {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// The rectangle covering the whole screen
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}

/// Bounds of one physical monitor in a multi-monitor layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorInfo {
    /// Position in the list reported by the display server
    pub index: usize,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl MonitorInfo {
    pub fn new(index: usize, x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            index,
            x,
            y,
            width,
            height,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}
