//! In-memory display server used by unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use image::{Rgba, RgbaImage};

use crate::display::{
    CursorGlyph, CursorImage, DisplayError, FrameSource, GrabOutcome, InputSurface, PickerEvent,
    Sleeper, WindowAttributes, WindowHandle, WindowQueries, WindowTree,
};
use crate::geometry::{MonitorInfo, Point, Rect, ScreenInfo};
use crate::select::LineOptions;

pub const ROOT: WindowHandle = WindowHandle(1);

pub const CAPTURE_FILL: Rgba<u8> = Rgba([10, 20, 30, 255]);

#[derive(Debug, Clone)]
pub struct FakeWindow {
    pub parent: WindowHandle,
    pub children: Vec<WindowHandle>,
    pub origin: Point,
    pub width: i32,
    pub height: i32,
    pub border_width: i32,
    pub viewable: bool,
    pub wm_state: bool,
}

impl FakeWindow {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            parent: ROOT,
            children: Vec::new(),
            origin: Point::new(x, y),
            width,
            height,
            border_width: 0,
            viewable: true,
            wm_state: false,
        }
    }

    pub fn border(mut self, width: i32) -> Self {
        self.border_width = width;
        self
    }

    pub fn wm_state(mut self) -> Self {
        self.wm_state = true;
        self
    }

    pub fn unmapped(mut self) -> Self {
        self.viewable = false;
        self
    }
}

pub struct FakeDisplay {
    pub screen: ScreenInfo,
    pub windows: HashMap<WindowHandle, FakeWindow>,
    pub focus: WindowHandle,
    pub pointer: Point,
    /// Windows under the pointer from the top-level child of root downwards
    pub pointer_path: Vec<WindowHandle>,
    pub monitors: Vec<MonitorInfo>,
    /// Polls before a visibility notification shows up; `None` means never
    pub visibility_after: Cell<Option<u32>>,
    pub unmap_after: Cell<Option<u32>>,
    pub events: RefCell<VecDeque<PickerEvent>>,
    pub pointer_grab: GrabOutcome,
    pub keyboard_grabs: RefCell<VecDeque<GrabOutcome>>,
    pub cursor: Option<CursorImage>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeDisplay {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            screen: ScreenInfo::new(width, height),
            windows: HashMap::new(),
            focus: ROOT,
            pointer: Point::new(0, 0),
            pointer_path: Vec::new(),
            monitors: Vec::new(),
            visibility_after: Cell::new(Some(0)),
            unmap_after: Cell::new(Some(0)),
            events: RefCell::new(VecDeque::new()),
            pointer_grab: GrabOutcome::Success,
            keyboard_grabs: RefCell::new(VecDeque::new()),
            cursor: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Register a window under `parent` (root when `parent` is `ROOT`)
    pub fn add_window(&mut self, id: u32, parent: WindowHandle, mut window: FakeWindow) {
        let handle = WindowHandle(id);
        window.parent = parent;
        if let Some(p) = self.windows.get_mut(&parent) {
            p.children.push(handle);
        }
        self.windows.insert(handle, window);
    }

    pub fn script(&self, events: impl IntoIterator<Item = PickerEvent>) {
        self.events.borrow_mut().extend(events);
    }

    pub fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.as_str() == call).count()
    }

    fn root_children(&self) -> Vec<WindowHandle> {
        let mut children: Vec<WindowHandle> = self
            .windows
            .iter()
            .filter(|(_, w)| w.parent == ROOT)
            .map(|(h, _)| *h)
            .collect();
        children.sort_by_key(|h| h.0);
        children
    }

    fn countdown(cell: &Cell<Option<u32>>) -> bool {
        match cell.get() {
            Some(0) => true,
            Some(n) => {
                cell.set(Some(n - 1));
                false
            }
            None => false,
        }
    }
}

impl WindowQueries for FakeDisplay {
    fn screen(&self) -> ScreenInfo {
        self.screen
    }

    fn root(&self) -> WindowHandle {
        ROOT
    }

    fn input_focus(&self) -> Result<WindowHandle, DisplayError> {
        Ok(self.focus)
    }

    fn border_width(&self, window: WindowHandle) -> Result<Option<i32>, DisplayError> {
        if window == ROOT {
            return Ok(Some(0));
        }
        Ok(self.windows.get(&window).map(|w| w.border_width))
    }

    fn query_tree(&self, window: WindowHandle) -> Result<Option<WindowTree>, DisplayError> {
        if window == ROOT {
            return Ok(Some(WindowTree {
                root: ROOT,
                parent: None,
                children: self.root_children(),
            }));
        }
        Ok(self.windows.get(&window).map(|w| WindowTree {
            root: ROOT,
            parent: Some(w.parent),
            children: w.children.clone(),
        }))
    }

    fn has_wm_state(&self, window: WindowHandle) -> Result<bool, DisplayError> {
        Ok(self.windows.get(&window).is_some_and(|w| w.wm_state))
    }

    fn attributes(&self, window: WindowHandle) -> Result<Option<WindowAttributes>, DisplayError> {
        if window == ROOT {
            return Ok(Some(WindowAttributes {
                width: self.screen.width,
                height: self.screen.height,
                border_width: 0,
                viewable: true,
            }));
        }
        Ok(self.windows.get(&window).map(|w| WindowAttributes {
            width: w.width,
            height: w.height,
            border_width: w.border_width,
            viewable: w.viewable,
        }))
    }

    fn translate_to_root(&self, window: WindowHandle) -> Result<Point, DisplayError> {
        let mut point = Point::new(0, 0);
        let mut current = window;
        while let Some(w) = self.windows.get(&current) {
            point.x += w.origin.x;
            point.y += w.origin.y;
            current = w.parent;
        }
        Ok(point)
    }

    fn pointer_position(&self) -> Result<Point, DisplayError> {
        Ok(self.pointer)
    }

    fn child_under_pointer(
        &self,
        window: WindowHandle,
    ) -> Result<Option<WindowHandle>, DisplayError> {
        if window == ROOT {
            return Ok(self.pointer_path.first().copied());
        }
        Ok(self
            .pointer_path
            .iter()
            .position(|w| *w == window)
            .and_then(|i| self.pointer_path.get(i + 1).copied()))
    }

    fn raise_window(&self, window: WindowHandle) -> Result<(), DisplayError> {
        self.record(format!("raise {}", window));
        Ok(())
    }

    fn watch_visibility(&self, window: WindowHandle) -> Result<(), DisplayError> {
        self.record(format!("watch {}", window));
        Ok(())
    }

    fn visibility_changed(&self, _window: WindowHandle) -> Result<bool, DisplayError> {
        self.record("poll_visibility");
        Ok(Self::countdown(&self.visibility_after))
    }

    fn monitors(&self) -> Result<Vec<MonitorInfo>, DisplayError> {
        Ok(self.monitors.clone())
    }
}

impl InputSurface for FakeDisplay {
    fn grab_pointer(&self, glyph: CursorGlyph) -> Result<GrabOutcome, DisplayError> {
        self.record(format!("grab_pointer {:?}", glyph));
        Ok(self.pointer_grab.clone())
    }

    fn grab_keyboard(&self) -> Result<GrabOutcome, DisplayError> {
        self.record("grab_keyboard");
        Ok(self
            .keyboard_grabs
            .borrow_mut()
            .pop_front()
            .unwrap_or(GrabOutcome::Success))
    }

    fn ungrab_pointer(&self) -> Result<(), DisplayError> {
        self.record("ungrab_pointer");
        Ok(())
    }

    fn ungrab_keyboard(&self) -> Result<(), DisplayError> {
        self.record("ungrab_keyboard");
        Ok(())
    }

    fn set_pointer_glyph(&self, glyph: CursorGlyph) -> Result<(), DisplayError> {
        self.record(format!("glyph {:?}", glyph));
        Ok(())
    }

    fn create_overlay(&self, line: &LineOptions) -> Result<(), DisplayError> {
        self.record(format!("create_overlay {:?}", line.mode));
        Ok(())
    }

    fn draw_outline(&self, rect: Rect) -> Result<(), DisplayError> {
        self.record(format!("outline {},{},{},{}", rect.x, rect.y, rect.w, rect.h));
        Ok(())
    }

    fn unmap_overlay(&self) -> Result<(), DisplayError> {
        self.record("unmap_overlay");
        Ok(())
    }

    fn overlay_unmapped(&self) -> Result<bool, DisplayError> {
        self.record("poll_unmap");
        Ok(Self::countdown(&self.unmap_after))
    }

    fn destroy_overlay(&self) -> Result<(), DisplayError> {
        self.record("destroy_overlay");
        Ok(())
    }

    fn next_event(&self) -> Result<PickerEvent, DisplayError> {
        self.events
            .borrow_mut()
            .pop_front()
            .ok_or(DisplayError::RequestFailed {
                request: "wait_for_event",
                message: "connection closed".to_string(),
            })
    }
}

impl FrameSource for FakeDisplay {
    fn capture_rect(&self, rect: Rect) -> Result<RgbaImage, DisplayError> {
        self.record(format!("capture {},{},{},{}", rect.x, rect.y, rect.w, rect.h));
        Ok(RgbaImage::from_pixel(rect.w as u32, rect.h as u32, CAPTURE_FILL))
    }

    fn cursor_image(&self) -> Result<CursorImage, DisplayError> {
        self.cursor
            .clone()
            .ok_or(DisplayError::ExtensionMissing { name: "XFIXES" })
    }
}

/// Sleeper that returns immediately and counts calls
#[derive(Default)]
pub struct NoSleep {
    pub sleeps: Cell<u32>,
}

impl Sleeper for NoSleep {
    fn sleep(&self, _duration: Duration) {
        self.sleeps.set(self.sleeps.get() + 1);
    }
}
