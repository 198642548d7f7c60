use std::collections::HashMap;

use tracing::{debug, warn};
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::protocol::shape::{self, ConnectionExt as _};
use x11rb::protocol::xproto::{
    AtomEnum, ClipOrdering, ConnectionExt as _, CreateGCAux, CreateWindowAux, Cursor, EventMask,
    Font, Gcontext, GrabMode, GrabStatus, LineStyle as XLineStyle, PropMode, Rectangle,
    SubwindowMode, Window, WindowClass, GX,
};
use x11rb::wrapper::ConnectionExt as _;

use super::connection::DisplayConnection;
use super::errors::DisplayError;
use super::traits::InputSurface;
use super::types::{CursorGlyph, GrabOutcome, InputKey, PickerEvent};
use crate::geometry::{Point, Rect};
use crate::select::{LineOptions, LineStyle, OutlineMode};

fn pointer_events() -> EventMask {
    EventMask::BUTTON_MOTION | EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE
}

/// Server-side resources owned by one interactive pick
#[derive(Default)]
pub(crate) struct PickerResources {
    font: Option<Font>,
    cursors: HashMap<CursorGlyph, Cursor>,
    keymap: Option<KeyMap>,
    overlay: Option<Overlay>,
    unmapped: Option<Window>,
}

enum Overlay {
    /// Shaped override-redirect window showing only the outline
    Edge {
        window: Window,
        thickness: i32,
        mapped: bool,
    },
    /// XOR rectangle drawn straight onto the root window
    Classic {
        gc: Gcontext,
        last: Option<Rect>,
    },
}

struct KeyMap {
    min_keycode: u8,
    per_keycode: u8,
    keysyms: Vec<u32>,
}

impl KeyMap {
    fn keysym(&self, keycode: u8) -> u32 {
        let Some(offset) = keycode.checked_sub(self.min_keycode) else {
            return 0;
        };
        let index = usize::from(offset) * usize::from(self.per_keycode);
        self.keysyms.get(index).copied().unwrap_or(0)
    }
}

fn clamp_i16(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

fn clamp_u16(value: i32) -> u16 {
    value.clamp(0, i32::from(u16::MAX)) as u16
}

fn x_rect(x: i32, y: i32, w: i32, h: i32) -> Rectangle {
    Rectangle {
        x: clamp_i16(x),
        y: clamp_i16(y),
        width: clamp_u16(w),
        height: clamp_u16(h),
    }
}

/// The four bars of an outline `thickness` pixels wide, drawn just outside `rect`
fn outline_bars(rect: Rect, thickness: i32) -> [Rectangle; 4] {
    let t = thickness;
    [
        x_rect(rect.x - t, rect.y - t, t, rect.h + 2 * t),
        x_rect(rect.x + rect.w, rect.y - t, t, rect.h + 2 * t),
        x_rect(rect.x, rect.y - t, rect.w, t),
        x_rect(rect.x, rect.y + rect.h, rect.w, t),
    ]
}

fn grab_outcome(status: GrabStatus) -> GrabOutcome {
    if status == GrabStatus::SUCCESS {
        GrabOutcome::Success
    } else if status == GrabStatus::ALREADY_GRABBED {
        GrabOutcome::AlreadyGrabbed
    } else {
        GrabOutcome::Denied(format!("{:?}", status))
    }
}

impl DisplayConnection {
    fn cursor(&self, glyph: CursorGlyph) -> Result<Cursor, DisplayError> {
        let mut picker = self.picker.borrow_mut();
        if let Some(cursor) = picker.cursors.get(&glyph) {
            return Ok(*cursor);
        }

        let font = match picker.font {
            Some(font) => font,
            None => {
                let font = self
                    .conn
                    .generate_id()
                    .map_err(DisplayError::request("generate_id"))?;
                self.conn
                    .open_font(font, b"cursor")
                    .map_err(DisplayError::request("open_font"))?;
                picker.font = Some(font);
                font
            }
        };

        let cursor = self
            .conn
            .generate_id()
            .map_err(DisplayError::request("generate_id"))?;
        let index = glyph.font_index();
        self.conn
            .create_glyph_cursor(
                cursor,
                font,
                font,
                index,
                index + 1,
                0,
                0,
                0,
                0xffff,
                0xffff,
                0xffff,
            )
            .map_err(DisplayError::request("create_glyph_cursor"))?;
        picker.cursors.insert(glyph, cursor);
        Ok(cursor)
    }

    fn load_keymap(&self) -> Result<(), DisplayError> {
        if self.picker.borrow().keymap.is_some() {
            return Ok(());
        }

        let setup = self.conn.setup();
        let min_keycode = setup.min_keycode;
        let count = setup.max_keycode - min_keycode + 1;
        let reply = self
            .conn
            .get_keyboard_mapping(min_keycode, count)
            .map_err(DisplayError::request("get_keyboard_mapping"))?
            .reply()
            .map_err(DisplayError::request("get_keyboard_mapping"))?;

        self.picker.borrow_mut().keymap = Some(KeyMap {
            min_keycode,
            per_keycode: reply.keysyms_per_keycode,
            keysyms: reply.keysyms,
        });
        Ok(())
    }

    fn translate_key(&self, keycode: u8) -> InputKey {
        let keysym = self
            .picker
            .borrow()
            .keymap
            .as_ref()
            .map_or(0, |map| map.keysym(keycode));
        InputKey::from_keysym(keysym)
    }

    fn outline_pixel(&self, line: &LineOptions) -> Result<u32, DisplayError> {
        let reply = self
            .conn
            .alloc_named_color(self.colormap, line.color.as_bytes())
            .map_err(DisplayError::request("alloc_named_color"))?
            .reply()
            .map_err(|e| DisplayError::RequestFailed {
                request: "alloc_named_color",
                message: format!("unable to allocate colour '{}': {}", line.color, e),
            })?;
        Ok(reply.pixel)
    }

    fn create_edge_overlay(&self, line: &LineOptions, pixel: u32) -> Result<Overlay, DisplayError> {
        let window = self
            .conn
            .generate_id()
            .map_err(DisplayError::request("generate_id"))?;

        self.conn
            .create_window(
                x11rb::COPY_DEPTH_FROM_PARENT,
                window,
                self.root,
                0,
                0,
                clamp_u16(self.screen.width),
                clamp_u16(self.screen.height),
                0,
                WindowClass::INPUT_OUTPUT,
                x11rb::COPY_FROM_PARENT,
                &CreateWindowAux::new()
                    .background_pixel(pixel)
                    .override_redirect(1)
                    .event_mask(EventMask::STRUCTURE_NOTIFY),
            )
            .map_err(DisplayError::request("create_window"))?;

        let window_type = self.intern("_NET_WM_WINDOW_TYPE")?;
        let dock = self.intern("_NET_WM_WINDOW_TYPE_DOCK")?;
        self.conn
            .change_property32(PropMode::REPLACE, window, window_type, AtomEnum::ATOM, &[dock])
            .map_err(DisplayError::request("change_property"))?;
        self.conn
            .change_property8(
                PropMode::REPLACE,
                window,
                AtomEnum::WM_CLASS,
                AtomEnum::STRING,
                b"sr\0sr\0",
            )
            .map_err(DisplayError::request("change_property"))?;

        if line.opacity < 100 {
            let opacity = self.intern("_NET_WM_WINDOW_OPACITY")?;
            let value = (u64::from(u32::MAX) * u64::from(line.opacity) / 100) as u32;
            self.conn
                .change_property32(PropMode::REPLACE, window, opacity, AtomEnum::CARDINAL, &[value])
                .map_err(DisplayError::request("change_property"))?;
        }

        // Empty input shape lets clicks through; empty bounding shape hides it until the first draw
        for kind in [shape::SK::INPUT, shape::SK::BOUNDING] {
            self.conn
                .shape_rectangles(
                    shape::SO::SET,
                    kind,
                    ClipOrdering::UNSORTED,
                    window,
                    0,
                    0,
                    &[],
                )
                .map_err(DisplayError::request("shape_rectangles"))?;
        }

        Ok(Overlay::Edge {
            window,
            thickness: i32::from(line.width),
            mapped: false,
        })
    }

    fn create_classic_overlay(
        &self,
        line: &LineOptions,
        pixel: u32,
    ) -> Result<Overlay, DisplayError> {
        let gc = self
            .conn
            .generate_id()
            .map_err(DisplayError::request("generate_id"))?;
        let style = match line.style {
            LineStyle::Solid => XLineStyle::SOLID,
            LineStyle::Dash => XLineStyle::ON_OFF_DASH,
        };
        self.conn
            .create_gc(
                gc,
                self.root,
                &CreateGCAux::new()
                    .function(GX::XOR)
                    .foreground(pixel)
                    .line_width(u32::from(line.width))
                    .line_style(style)
                    .subwindow_mode(SubwindowMode::INCLUDE_INFERIORS),
            )
            .map_err(DisplayError::request("create_gc"))?;
        Ok(Overlay::Classic { gc, last: None })
    }

    fn intern(&self, name: &str) -> Result<u32, DisplayError> {
        Ok(self
            .conn
            .intern_atom(false, name.as_bytes())
            .map_err(DisplayError::request("intern_atom"))?
            .reply()
            .map_err(DisplayError::request("intern_atom"))?
            .atom)
    }

    fn xor_rectangle(&self, gc: Gcontext, rect: Rect) -> Result<(), DisplayError> {
        self.conn
            .poly_rectangle(self.root, gc, &[x_rect(rect.x, rect.y, rect.w, rect.h)])
            .map_err(DisplayError::request("poly_rectangle"))?;
        Ok(())
    }
}

impl InputSurface for DisplayConnection {
    fn grab_pointer(&self, glyph: CursorGlyph) -> Result<GrabOutcome, DisplayError> {
        let cursor = self.cursor(glyph)?;
        let reply = self
            .conn
            .grab_pointer(
                false,
                self.root,
                pointer_events(),
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                self.root,
                cursor,
                x11rb::CURRENT_TIME,
            )
            .map_err(DisplayError::request("grab_pointer"))?
            .reply()
            .map_err(DisplayError::request("grab_pointer"))?;
        Ok(grab_outcome(reply.status))
    }

    fn grab_keyboard(&self) -> Result<GrabOutcome, DisplayError> {
        self.load_keymap()?;
        let reply = self
            .conn
            .grab_keyboard(
                false,
                self.root,
                x11rb::CURRENT_TIME,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            )
            .map_err(DisplayError::request("grab_keyboard"))?
            .reply()
            .map_err(DisplayError::request("grab_keyboard"))?;
        Ok(grab_outcome(reply.status))
    }

    fn ungrab_pointer(&self) -> Result<(), DisplayError> {
        self.conn
            .ungrab_pointer(x11rb::CURRENT_TIME)
            .map_err(DisplayError::request("ungrab_pointer"))?;
        self.flush()
    }

    fn ungrab_keyboard(&self) -> Result<(), DisplayError> {
        self.conn
            .ungrab_keyboard(x11rb::CURRENT_TIME)
            .map_err(DisplayError::request("ungrab_keyboard"))?;
        self.flush()
    }

    fn set_pointer_glyph(&self, glyph: CursorGlyph) -> Result<(), DisplayError> {
        let cursor = self.cursor(glyph)?;
        self.conn
            .change_active_pointer_grab(cursor, x11rb::CURRENT_TIME, pointer_events())
            .map_err(DisplayError::request("change_active_pointer_grab"))?;
        Ok(())
    }

    fn create_overlay(&self, line: &LineOptions) -> Result<(), DisplayError> {
        let pixel = self.outline_pixel(line)?;
        let overlay = match line.mode {
            OutlineMode::Edge => self.create_edge_overlay(line, pixel)?,
            OutlineMode::Classic => self.create_classic_overlay(line, pixel)?,
        };
        self.picker.borrow_mut().overlay = Some(overlay);
        debug!(event = "core.display.overlay_created", mode = ?line.mode);
        self.flush()
    }

    fn draw_outline(&self, rect: Rect) -> Result<(), DisplayError> {
        let mut guard = self.picker.borrow_mut();
        match guard.overlay.as_mut() {
            Some(Overlay::Edge {
                window,
                thickness,
                mapped,
            }) => {
                self.conn
                    .shape_rectangles(
                        shape::SO::SET,
                        shape::SK::BOUNDING,
                        ClipOrdering::UNSORTED,
                        *window,
                        0,
                        0,
                        &outline_bars(rect, *thickness),
                    )
                    .map_err(DisplayError::request("shape_rectangles"))?;
                if !*mapped {
                    self.conn
                        .map_window(*window)
                        .map_err(DisplayError::request("map_window"))?;
                    *mapped = true;
                }
            }
            Some(Overlay::Classic { gc, last }) => {
                if let Some(previous) = last.take() {
                    self.xor_rectangle(*gc, previous)?;
                }
                self.xor_rectangle(*gc, rect)?;
                *last = Some(rect);
            }
            None => return Ok(()),
        }
        drop(guard);
        self.flush()
    }

    fn unmap_overlay(&self) -> Result<(), DisplayError> {
        let mut guard = self.picker.borrow_mut();
        let picker = &mut *guard;
        match picker.overlay.as_mut() {
            Some(Overlay::Edge { window, mapped, .. }) => {
                let window = *window;
                if *mapped {
                    self.conn
                        .unmap_window(window)
                        .map_err(DisplayError::request("unmap_window"))?;
                    *mapped = false;
                    picker.unmapped = Some(window);
                }
            }
            Some(Overlay::Classic { gc, last }) => {
                if let Some(previous) = last.take() {
                    self.xor_rectangle(*gc, previous)?;
                }
            }
            None => return Ok(()),
        }
        drop(guard);
        self.flush()
    }

    fn overlay_unmapped(&self) -> Result<bool, DisplayError> {
        let Some(window) = self.picker.borrow().unmapped else {
            return Ok(true);
        };
        let seen = self.take_event(|event| {
            matches!(event, Event::UnmapNotify(e) if e.window == window)
        })?;
        if seen {
            self.picker.borrow_mut().unmapped = None;
        }
        Ok(seen)
    }

    fn destroy_overlay(&self) -> Result<(), DisplayError> {
        let overlay = self.picker.borrow_mut().overlay.take();
        match overlay {
            Some(Overlay::Edge { window, .. }) => {
                self.conn
                    .destroy_window(window)
                    .map_err(DisplayError::request("destroy_window"))?;
            }
            Some(Overlay::Classic { gc, .. }) => {
                self.conn
                    .free_gc(gc)
                    .map_err(DisplayError::request("free_gc"))?;
            }
            None => return Ok(()),
        }
        self.flush()
    }

    fn next_event(&self) -> Result<PickerEvent, DisplayError> {
        loop {
            let event = match self.wait_event()? {
                Event::ButtonPress(e) => {
                    PickerEvent::ButtonPress(Point::new(e.root_x.into(), e.root_y.into()))
                }
                Event::MotionNotify(e) => {
                    PickerEvent::Motion(Point::new(e.root_x.into(), e.root_y.into()))
                }
                Event::ButtonRelease(e) => {
                    PickerEvent::ButtonRelease(Point::new(e.root_x.into(), e.root_y.into()))
                }
                Event::KeyPress(e) => PickerEvent::Key(self.translate_key(e.detail)),
                Event::Error(e) => {
                    warn!(event = "core.display.async_error", error = ?e.error_kind);
                    continue;
                }
                _ => continue,
            };
            return Ok(event);
        }
    }
}
