use crate::geometry::Point;

/// Server-side window identifier. Only valid for the connection it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u32);

impl std::fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Result of a window-tree query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowTree {
    pub root: WindowHandle,
    /// `None` for the root window itself
    pub parent: Option<WindowHandle>,
    /// Children in stacking order, bottom-most first
    pub children: Vec<WindowHandle>,
}

/// Size, map state and border of a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowAttributes {
    pub width: i32,
    pub height: i32,
    pub border_width: i32,
    /// Mapped and all ancestors mapped
    pub viewable: bool,
}

/// Current mouse cursor image as reported by XFixes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorImage {
    /// Pointer position in root coordinates
    pub position: Point,
    /// Offset of the logical pointer position inside the image
    pub hotspot: Point,
    pub width: u32,
    pub height: u32,
    /// Premultiplied ARGB, one `u32` per pixel, row-major
    pub pixels: Vec<u32>,
}

/// Outcome of an exclusive grab request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrabOutcome {
    Success,
    /// Another client holds the grab; worth retrying
    AlreadyGrabbed,
    /// Any other refusal (frozen, invalid time, not viewable)
    Denied(String),
}

/// Pointer glyphs shown while picking a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorGlyph {
    Crosshair,
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

impl CursorGlyph {
    /// Glyph index in the X cursor font
    pub fn font_index(self) -> u16 {
        match self {
            CursorGlyph::Crosshair => 30,
            CursorGlyph::LowerLeft => 76,
            CursorGlyph::LowerRight => 78,
            CursorGlyph::UpperLeft => 144,
            CursorGlyph::UpperRight => 148,
        }
    }

    /// Corner glyph for a drag from `anchor` towards `corner`
    pub fn for_drag(anchor: Point, corner: Point) -> Self {
        let right = anchor.x < corner.x;
        let down = anchor.y < corner.y;
        match (right, down) {
            (true, true) => CursorGlyph::LowerRight,
            (true, false) => CursorGlyph::UpperRight,
            (false, true) => CursorGlyph::LowerLeft,
            (false, false) => CursorGlyph::UpperLeft,
        }
    }
}

pub const KEYSYM_LEFT: u32 = 0xff51;
pub const KEYSYM_UP: u32 = 0xff52;
pub const KEYSYM_RIGHT: u32 = 0xff53;
pub const KEYSYM_DOWN: u32 = 0xff54;

/// A key press, reduced to what the picker cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    Left,
    Right,
    Up,
    Down,
    Other(u32),
}

impl InputKey {
    pub fn from_keysym(keysym: u32) -> Self {
        match keysym {
            KEYSYM_LEFT => InputKey::Left,
            KEYSYM_RIGHT => InputKey::Right,
            KEYSYM_UP => InputKey::Up,
            KEYSYM_DOWN => InputKey::Down,
            other => InputKey::Other(other),
        }
    }
}

/// Input delivered to the picker while pointer and keyboard are grabbed.
/// Positions are root coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerEvent {
    ButtonPress(Point),
    Motion(Point),
    ButtonRelease(Point),
    Key(InputKey),
}
