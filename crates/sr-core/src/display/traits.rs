//! Capabilities the core consumes from the display server.
//!
//! `DisplayConnection` implements all of them against a live X server; tests
//! substitute in-memory fakes.

use image::RgbaImage;

use super::errors::DisplayError;
use super::types::{
    CursorGlyph, CursorImage, GrabOutcome, PickerEvent, WindowAttributes, WindowHandle, WindowTree,
};
use crate::geometry::{MonitorInfo, Point, Rect, ScreenInfo};
use crate::select::LineOptions;

/// Window and pointer queries.
///
/// Methods returning `Option` yield `None` when the window no longer exists.
pub trait WindowQueries {
    fn screen(&self) -> ScreenInfo;

    fn root(&self) -> WindowHandle;

    fn input_focus(&self) -> Result<WindowHandle, DisplayError>;

    /// Confirms that a window exists and returns its border width
    fn border_width(&self, window: WindowHandle) -> Result<Option<i32>, DisplayError>;

    fn query_tree(&self, window: WindowHandle) -> Result<Option<WindowTree>, DisplayError>;

    /// Whether the window carries the window manager's `WM_STATE` property
    fn has_wm_state(&self, window: WindowHandle) -> Result<bool, DisplayError>;

    fn attributes(&self, window: WindowHandle) -> Result<Option<WindowAttributes>, DisplayError>;

    /// Position of the window's origin in root coordinates
    fn translate_to_root(&self, window: WindowHandle) -> Result<Point, DisplayError>;

    fn pointer_position(&self) -> Result<Point, DisplayError>;

    /// Child of `window` that contains the pointer, if any
    fn child_under_pointer(
        &self,
        window: WindowHandle,
    ) -> Result<Option<WindowHandle>, DisplayError>;

    fn raise_window(&self, window: WindowHandle) -> Result<(), DisplayError>;

    /// Ask for visibility notifications on `window`
    fn watch_visibility(&self, window: WindowHandle) -> Result<(), DisplayError>;

    /// Consume a pending visibility notification for `window`, if one arrived
    fn visibility_changed(&self, window: WindowHandle) -> Result<bool, DisplayError>;

    /// Physical monitor layout. Empty when no multi-monitor information exists.
    fn monitors(&self) -> Result<Vec<MonitorInfo>, DisplayError>;
}

/// Exclusive input and the selection outline used by the interactive picker
pub trait InputSurface {
    fn grab_pointer(&self, glyph: CursorGlyph) -> Result<GrabOutcome, DisplayError>;

    fn grab_keyboard(&self) -> Result<GrabOutcome, DisplayError>;

    fn ungrab_pointer(&self) -> Result<(), DisplayError>;

    fn ungrab_keyboard(&self) -> Result<(), DisplayError>;

    /// Change the glyph of the active pointer grab
    fn set_pointer_glyph(&self, glyph: CursorGlyph) -> Result<(), DisplayError>;

    fn create_overlay(&self, line: &LineOptions) -> Result<(), DisplayError>;

    /// Show the outline of a normalized rectangle
    fn draw_outline(&self, rect: Rect) -> Result<(), DisplayError>;

    fn unmap_overlay(&self) -> Result<(), DisplayError>;

    /// Whether the server has reported the overlay unmapped
    fn overlay_unmapped(&self) -> Result<bool, DisplayError>;

    fn destroy_overlay(&self) -> Result<(), DisplayError>;

    /// Block until the next input event relevant to picking
    fn next_event(&self) -> Result<PickerEvent, DisplayError>;
}

/// Pixel capture of the root window
pub trait FrameSource {
    fn capture_rect(&self, rect: Rect) -> Result<RgbaImage, DisplayError>;

    fn cursor_image(&self) -> Result<CursorImage, DisplayError>;
}

/// Everything needed to resolve a region and capture it
pub trait DisplayBackend: WindowQueries + InputSurface + FrameSource {}

impl<T: WindowQueries + InputSurface + FrameSource + ?Sized> DisplayBackend for T {}
