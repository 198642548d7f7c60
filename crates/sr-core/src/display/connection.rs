use std::cell::RefCell;
use std::collections::VecDeque;

use image::RgbaImage;
use tracing::{debug, info, warn};
use x11rb::connection::{Connection, RequestConnection};
use x11rb::errors::ReplyError;
use x11rb::protocol::Event;
use x11rb::protocol::xfixes::{self, ConnectionExt as _};
use x11rb::protocol::xinerama::{self, ConnectionExt as _};
use x11rb::protocol::xproto::{
    Atom, AtomEnum, ChangeWindowAttributesAux, ConfigureWindowAux, ConnectionExt as _, EventMask,
    ImageFormat, MapState, StackMode, Window,
};
use x11rb::rust_connection::RustConnection;

use super::errors::DisplayError;
use super::input::PickerResources;
use super::traits::{FrameSource, WindowQueries};
use super::types::{CursorImage, WindowAttributes, WindowHandle, WindowTree};
use crate::geometry::{MonitorInfo, Point, Rect, ScreenInfo};

/// Owned connection to an X display.
///
/// Created once per process; the socket is closed when the value is dropped,
/// which also makes the server release any grab still held by this client.
pub struct DisplayConnection {
    pub(super) conn: RustConnection,
    pub(super) root: Window,
    pub(super) colormap: u32,
    pub(super) screen: ScreenInfo,
    wm_state: Option<Atom>,
    xfixes: bool,
    pending: RefCell<VecDeque<Event>>,
    pub(super) picker: RefCell<PickerResources>,
}

impl DisplayConnection {
    /// Connect to `display`, or to `$DISPLAY` when `None`
    pub fn open(display: Option<&str>) -> Result<Self, DisplayError> {
        let display_name = display
            .map(str::to_string)
            .or_else(|| std::env::var("DISPLAY").ok())
            .unwrap_or_default();
        info!(event = "core.display.open_started", display = %display_name);

        let (conn, screen_num) =
            x11rb::connect(display).map_err(|e| DisplayError::ConnectFailed {
                display: display_name.clone(),
                message: e.to_string(),
            })?;

        let (root, colormap, screen) = {
            let setup_screen = conn.setup().roots.get(screen_num).ok_or_else(|| {
                DisplayError::ConnectFailed {
                    display: display_name.clone(),
                    message: format!("screen {} not present", screen_num),
                }
            })?;
            (
                setup_screen.root,
                setup_screen.default_colormap,
                ScreenInfo::new(
                    i32::from(setup_screen.width_in_pixels),
                    i32::from(setup_screen.height_in_pixels),
                ),
            )
        };

        let wm_state = conn
            .intern_atom(true, b"WM_STATE")
            .map_err(DisplayError::request("intern_atom"))?
            .reply()
            .map_err(DisplayError::request("intern_atom"))?
            .atom;
        let wm_state = (wm_state != x11rb::NONE).then_some(wm_state);

        let xfixes = negotiate_xfixes(&conn);

        info!(
            event = "core.display.open_completed",
            display = %display_name,
            width = screen.width,
            height = screen.height,
            xfixes = xfixes
        );

        Ok(Self {
            conn,
            root,
            colormap,
            screen,
            wm_state,
            xfixes,
            pending: RefCell::new(VecDeque::new()),
            picker: RefCell::new(PickerResources::default()),
        })
    }

    /// Grab the whole server so the screen cannot change until the guard drops
    pub fn freeze(&self) -> Result<ServerGrab<'_>, DisplayError> {
        self.conn
            .grab_server()
            .map_err(DisplayError::request("grab_server"))?;
        self.flush()?;
        info!(event = "core.display.freeze_started");
        Ok(ServerGrab { conn: &self.conn })
    }

    pub(super) fn flush(&self) -> Result<(), DisplayError> {
        self.conn.flush().map_err(DisplayError::request("flush"))
    }

    /// Remove the first queued event matching `predicate`.
    ///
    /// Other events stay queued in arrival order.
    pub(super) fn take_event<F>(&self, predicate: F) -> Result<bool, DisplayError>
    where
        F: Fn(&Event) -> bool,
    {
        let mut pending = self.pending.borrow_mut();
        while let Some(event) = self
            .conn
            .poll_for_event()
            .map_err(DisplayError::request("poll_for_event"))?
        {
            pending.push_back(event);
        }

        match pending.iter().position(|e| predicate(e)) {
            Some(index) => {
                pending.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Next event, oldest queued first
    pub(super) fn wait_event(&self) -> Result<Event, DisplayError> {
        if let Some(event) = self.pending.borrow_mut().pop_front() {
            return Ok(event);
        }
        self.conn
            .wait_for_event()
            .map_err(DisplayError::request("wait_for_event"))
    }
}

/// Server grab taken by [`DisplayConnection::freeze`]; released on drop
pub struct ServerGrab<'a> {
    conn: &'a RustConnection,
}

impl Drop for ServerGrab<'_> {
    fn drop(&mut self) {
        let released = self
            .conn
            .ungrab_server()
            .map(|_| ())
            .and_then(|()| self.conn.flush());
        match released {
            Ok(()) => info!(event = "core.display.freeze_completed"),
            Err(e) => warn!(event = "core.display.freeze_release_failed", error = %e),
        }
    }
}

fn negotiate_xfixes(conn: &RustConnection) -> bool {
    match conn.extension_information(xfixes::X11_EXTENSION_NAME) {
        Ok(Some(_)) => {}
        Ok(None) => return false,
        Err(e) => {
            debug!(event = "core.display.xfixes_probe_failed", error = %e);
            return false;
        }
    }
    match conn.xfixes_query_version(4, 0).map(|cookie| cookie.reply()) {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            debug!(event = "core.display.xfixes_version_failed", error = %e);
            false
        }
        Err(e) => {
            debug!(event = "core.display.xfixes_version_failed", error = %e);
            false
        }
    }
}

/// Treat a protocol error (e.g. BadWindow) as "absent", anything else as failure
fn absent_on_x11_error<T>(
    request: &'static str,
    result: Result<T, ReplyError>,
) -> Result<Option<T>, DisplayError> {
    match result {
        Ok(reply) => Ok(Some(reply)),
        Err(ReplyError::X11Error(e)) => {
            debug!(
                event = "core.display.request_rejected",
                request = request,
                error = ?e.error_kind
            );
            Ok(None)
        }
        Err(e) => Err(DisplayError::request(request)(e)),
    }
}

/// Convert a ZPixmap reply (32 bits per pixel, BGRX byte order) to RGBA
pub(crate) fn bgrx_to_rgba(
    width: u32,
    height: u32,
    depth: u8,
    data: Vec<u8>,
) -> Result<RgbaImage, DisplayError> {
    if depth != 24 && depth != 32 {
        return Err(DisplayError::RequestFailed {
            request: "get_image",
            message: format!("unsupported pixel depth {}", depth),
        });
    }
    let expected = width as usize * height as usize * 4;
    if data.len() != expected {
        return Err(DisplayError::RequestFailed {
            request: "get_image",
            message: format!(
                "unexpected image size {} for {}x{} (only 32 bits per pixel is supported)",
                data.len(),
                width,
                height
            ),
        });
    }

    let mut rgba = data;
    for pixel in rgba.chunks_exact_mut(4) {
        pixel.swap(0, 2);
        pixel[3] = 0xff;
    }

    RgbaImage::from_raw(width, height, rgba).ok_or(DisplayError::RequestFailed {
        request: "get_image",
        message: "image buffer too small".to_string(),
    })
}

fn to_i16(request: &'static str, value: i32) -> Result<i16, DisplayError> {
    i16::try_from(value).map_err(DisplayError::request(request))
}

fn to_u16(request: &'static str, value: i32) -> Result<u16, DisplayError> {
    u16::try_from(value).map_err(DisplayError::request(request))
}

impl WindowQueries for DisplayConnection {
    fn screen(&self) -> ScreenInfo {
        self.screen
    }

    fn root(&self) -> WindowHandle {
        WindowHandle(self.root)
    }

    fn input_focus(&self) -> Result<WindowHandle, DisplayError> {
        let reply = self
            .conn
            .get_input_focus()
            .map_err(DisplayError::request("get_input_focus"))?
            .reply()
            .map_err(DisplayError::request("get_input_focus"))?;
        // None and PointerRoot carry no window; fall back to the whole screen
        match reply.focus {
            0 | 1 => Ok(WindowHandle(self.root)),
            focus => Ok(WindowHandle(focus)),
        }
    }

    fn border_width(&self, window: WindowHandle) -> Result<Option<i32>, DisplayError> {
        let cookie = self
            .conn
            .get_geometry(window.0)
            .map_err(DisplayError::request("get_geometry"))?;
        let reply = absent_on_x11_error("get_geometry", cookie.reply())?;
        Ok(reply.map(|r| i32::from(r.border_width)))
    }

    fn query_tree(&self, window: WindowHandle) -> Result<Option<WindowTree>, DisplayError> {
        let cookie = self
            .conn
            .query_tree(window.0)
            .map_err(DisplayError::request("query_tree"))?;
        let reply = absent_on_x11_error("query_tree", cookie.reply())?;
        Ok(reply.map(|r| WindowTree {
            root: WindowHandle(r.root),
            parent: (r.parent != x11rb::NONE).then_some(WindowHandle(r.parent)),
            children: r.children.into_iter().map(WindowHandle).collect(),
        }))
    }

    fn has_wm_state(&self, window: WindowHandle) -> Result<bool, DisplayError> {
        let Some(atom) = self.wm_state else {
            return Ok(false);
        };
        let cookie = self
            .conn
            .get_property(false, window.0, atom, AtomEnum::ANY, 0, 0)
            .map_err(DisplayError::request("get_property"))?;
        let reply = absent_on_x11_error("get_property", cookie.reply())?;
        Ok(reply.is_some_and(|r| r.type_ != x11rb::NONE))
    }

    fn attributes(&self, window: WindowHandle) -> Result<Option<WindowAttributes>, DisplayError> {
        let attrs_cookie = self
            .conn
            .get_window_attributes(window.0)
            .map_err(DisplayError::request("get_window_attributes"))?;
        let geometry_cookie = self
            .conn
            .get_geometry(window.0)
            .map_err(DisplayError::request("get_geometry"))?;

        let attrs = absent_on_x11_error("get_window_attributes", attrs_cookie.reply())?;
        let geometry = absent_on_x11_error("get_geometry", geometry_cookie.reply())?;

        Ok(attrs.zip(geometry).map(|(a, g)| WindowAttributes {
            width: i32::from(g.width),
            height: i32::from(g.height),
            border_width: i32::from(g.border_width),
            viewable: a.map_state == MapState::VIEWABLE,
        }))
    }

    fn translate_to_root(&self, window: WindowHandle) -> Result<Point, DisplayError> {
        let reply = self
            .conn
            .translate_coordinates(window.0, self.root, 0, 0)
            .map_err(DisplayError::request("translate_coordinates"))?
            .reply()
            .map_err(DisplayError::request("translate_coordinates"))?;
        Ok(Point::new(i32::from(reply.dst_x), i32::from(reply.dst_y)))
    }

    fn pointer_position(&self) -> Result<Point, DisplayError> {
        let reply = self
            .conn
            .query_pointer(self.root)
            .map_err(DisplayError::request("query_pointer"))?
            .reply()
            .map_err(DisplayError::request("query_pointer"))?;
        Ok(Point::new(i32::from(reply.root_x), i32::from(reply.root_y)))
    }

    fn child_under_pointer(
        &self,
        window: WindowHandle,
    ) -> Result<Option<WindowHandle>, DisplayError> {
        let cookie = self
            .conn
            .query_pointer(window.0)
            .map_err(DisplayError::request("query_pointer"))?;
        let reply = absent_on_x11_error("query_pointer", cookie.reply())?;
        Ok(reply
            .filter(|r| r.child != x11rb::NONE)
            .map(|r| WindowHandle(r.child)))
    }

    fn raise_window(&self, window: WindowHandle) -> Result<(), DisplayError> {
        self.conn
            .configure_window(window.0, &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE))
            .map_err(DisplayError::request("configure_window"))?;
        self.flush()
    }

    fn watch_visibility(&self, window: WindowHandle) -> Result<(), DisplayError> {
        self.conn
            .change_window_attributes(
                window.0,
                &ChangeWindowAttributesAux::new().event_mask(EventMask::VISIBILITY_CHANGE),
            )
            .map_err(DisplayError::request("change_window_attributes"))?;
        self.flush()
    }

    fn visibility_changed(&self, window: WindowHandle) -> Result<bool, DisplayError> {
        self.take_event(|event| {
            matches!(event, Event::VisibilityNotify(e) if e.window == window.0)
        })
    }

    fn monitors(&self) -> Result<Vec<MonitorInfo>, DisplayError> {
        let present = self
            .conn
            .extension_information(xinerama::X11_EXTENSION_NAME)
            .map_err(DisplayError::request("query_extension"))?
            .is_some();
        if !present {
            debug!(event = "core.display.monitors_unavailable", reason = "no xinerama");
            return Ok(Vec::new());
        }

        let active = self
            .conn
            .xinerama_is_active()
            .map_err(DisplayError::request("xinerama_is_active"))?
            .reply()
            .map_err(DisplayError::request("xinerama_is_active"))?
            .state
            != 0;
        if !active {
            debug!(event = "core.display.monitors_unavailable", reason = "xinerama inactive");
            return Ok(Vec::new());
        }

        let reply = self
            .conn
            .xinerama_query_screens()
            .map_err(DisplayError::request("xinerama_query_screens"))?
            .reply()
            .map_err(DisplayError::request("xinerama_query_screens"))?;

        Ok(reply
            .screen_info
            .iter()
            .enumerate()
            .map(|(index, s)| {
                MonitorInfo::new(
                    index,
                    i32::from(s.x_org),
                    i32::from(s.y_org),
                    i32::from(s.width),
                    i32::from(s.height),
                )
            })
            .collect())
    }
}

impl FrameSource for DisplayConnection {
    fn capture_rect(&self, rect: Rect) -> Result<RgbaImage, DisplayError> {
        debug!(event = "core.display.get_image_started", rect = ?rect);

        let reply = self
            .conn
            .get_image(
                ImageFormat::Z_PIXMAP,
                self.root,
                to_i16("get_image", rect.x)?,
                to_i16("get_image", rect.y)?,
                to_u16("get_image", rect.w)?,
                to_u16("get_image", rect.h)?,
                !0,
            )
            .map_err(DisplayError::request("get_image"))?
            .reply()
            .map_err(DisplayError::request("get_image"))?;

        bgrx_to_rgba(rect.w as u32, rect.h as u32, reply.depth, reply.data)
    }

    fn cursor_image(&self) -> Result<CursorImage, DisplayError> {
        if !self.xfixes {
            return Err(DisplayError::ExtensionMissing { name: "XFIXES" });
        }

        let reply = self
            .conn
            .xfixes_get_cursor_image()
            .map_err(DisplayError::request("xfixes_get_cursor_image"))?
            .reply()
            .map_err(DisplayError::request("xfixes_get_cursor_image"))?;

        Ok(CursorImage {
            position: Point::new(i32::from(reply.x), i32::from(reply.y)),
            hotspot: Point::new(i32::from(reply.xhot), i32::from(reply.yhot)),
            width: u32::from(reply.width),
            height: u32::from(reply.height),
            pixels: reply.cursor_image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SrError;

    #[test]
    fn test_bgrx_to_rgba() {
        let data = vec![0x10, 0x20, 0x30, 0x00, 0xaa, 0xbb, 0xcc, 0x00];
        let image = bgrx_to_rgba(2, 1, 24, data).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [0x30, 0x20, 0x10, 0xff]);
        assert_eq!(image.get_pixel(1, 0).0, [0xcc, 0xbb, 0xaa, 0xff]);
    }

    #[test]
    fn test_bgrx_rejects_unsupported_depth() {
        let error = bgrx_to_rgba(1, 1, 16, vec![0, 0]).unwrap_err();
        assert_eq!(error.error_code(), "DISPLAY_REQUEST_FAILED");
        assert!(error.to_string().contains("unsupported pixel depth 16"));
    }

    #[test]
    fn test_bgrx_rejects_short_buffer() {
        let error = bgrx_to_rgba(2, 2, 24, vec![0; 12]).unwrap_err();
        assert!(error.to_string().contains("only 32 bits per pixel"));
    }

    #[test]
    fn test_open_invalid_display_fails() {
        let result = DisplayConnection::open(Some(":nonexistent-display-name"));
        assert!(result.is_err());
        if let Err(e) = result {
            assert_eq!(e.error_code(), "DISPLAY_UNAVAILABLE");
        }
    }
}
