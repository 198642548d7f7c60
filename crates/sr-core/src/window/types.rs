use crate::display::WindowHandle;

/// Outermost window-manager ancestor of a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// Last ancestor below the root; the window itself when it is top-level
    pub frame: WindowHandle,
    /// Number of parent steps taken to reach `frame`
    pub frames: u32,
}

/// How a window's rectangle is measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowRectOptions {
    /// Measure the decorated frame (and the window border) instead of the client
    pub include_border: bool,
}
