use tracing::{debug, info, warn};

use super::errors::SelectError;
use super::state::{DragState, Transition};
use super::types::{PickerOptions, Selection};
use crate::display::{
    CursorGlyph, DisplayError, EVENT_SETTLE_BUDGET, GrabOutcome, InputSurface,
    KEYBOARD_GRAB_BUDGET, Sleeper, WindowQueries, wait_for,
};
use crate::window::innermost_window_at_pointer;

/// Server-side resources held while the user picks a region.
///
/// Dropping the session releases whatever it still holds, so grabs never
/// outlive the picker even when it bails out with an error.
struct InputSession<'a, S: InputSurface + ?Sized> {
    surface: &'a S,
    keyboard: bool,
    overlay: bool,
    released: bool,
}

impl<'a, S: InputSurface + ?Sized> InputSession<'a, S> {
    /// Wrap a surface whose pointer grab has just succeeded
    fn new(surface: &'a S) -> Self {
        Self {
            surface,
            keyboard: false,
            overlay: false,
            released: false,
        }
    }

    /// Ungrab input, then unmap and destroy the overlay. Runs at most once;
    /// every step is attempted and the first failure is reported.
    fn release(&mut self) -> Result<(), DisplayError> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        let mut steps = vec![self.surface.ungrab_pointer()];
        if self.keyboard {
            steps.push(self.surface.ungrab_keyboard());
        }
        if self.overlay {
            steps.push(self.surface.unmap_overlay());
            steps.push(self.surface.destroy_overlay());
        }

        debug!(event = "core.select.input_released");
        steps.into_iter().collect()
    }
}

impl<S: InputSurface + ?Sized> Drop for InputSession<'_, S> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(event = "core.select.release_failed", error = %e);
        }
    }
}

/// Let the user drag out a rectangle or click a window.
///
/// Pointer and keyboard are grabbed for the duration of the call and released
/// on every return path.
pub fn pick_region<B>(
    backend: &B,
    options: &PickerOptions,
    sleeper: &dyn Sleeper,
) -> Result<Selection, SelectError>
where
    B: WindowQueries + InputSurface,
{
    info!(
        event = "core.select.pick_started",
        mode = ?options.line.mode,
        cancel_key = ?options.cancel_key
    );

    match backend.grab_pointer(CursorGlyph::Crosshair)? {
        GrabOutcome::Success => {}
        GrabOutcome::AlreadyGrabbed => {
            return Err(SelectError::PointerGrabFailed {
                reason: "already grabbed by another client".to_string(),
            });
        }
        GrabOutcome::Denied(reason) => return Err(SelectError::PointerGrabFailed { reason }),
    }
    let mut session = InputSession::new(backend);

    let granted = wait_for(KEYBOARD_GRAB_BUDGET, sleeper, || {
        match backend.grab_keyboard()? {
            GrabOutcome::Success => Ok(true),
            GrabOutcome::AlreadyGrabbed => Ok(false),
            GrabOutcome::Denied(reason) => Err(SelectError::KeyboardGrabFailed { reason }),
        }
    })?;
    if !granted {
        return Err(SelectError::KeyboardGrabFailed {
            reason: format!(
                "still grabbed by another client after {} attempts",
                KEYBOARD_GRAB_BUDGET.attempts
            ),
        });
    }
    session.keyboard = true;
    info!(event = "core.select.grab_completed");

    session.overlay = true;
    backend.create_overlay(&options.line)?;

    let mut state = DragState::new(backend.screen());
    let mut target = None;
    let dragged = loop {
        match state.handle(backend.next_event()?, options.cancel_key)? {
            Transition::Ignored => {}
            Transition::Pressed(point) => {
                target = innermost_window_at_pointer(backend)?;
                debug!(
                    event = "core.select.button_pressed",
                    x = point.x,
                    y = point.y,
                    window = ?target.map(|w| w.to_string())
                );
            }
            Transition::Redraw { rect, glyph } => {
                if let Some(glyph) = glyph {
                    backend.set_pointer_glyph(glyph)?;
                }
                backend.draw_outline(rect)?;
            }
            Transition::Clicked => break None,
            Transition::Released(rect) => break Some(rect),
        }
    };

    session.release()?;

    let Some(rect) = dragged else {
        info!(
            event = "core.select.pick_completed",
            kind = "window",
            window = ?target.map(|w| w.to_string())
        );
        return Ok(Selection::Window(target));
    };

    // The capture must not see the outline; a degenerate rect is never captured
    if !rect.is_degenerate()
        && !wait_for(EVENT_SETTLE_BUDGET, sleeper, || backend.overlay_unmapped())?
    {
        warn!(event = "core.select.unmap_wait_expired");
    }

    info!(
        event = "core.select.pick_completed",
        kind = "region",
        x = rect.x,
        y = rect.y,
        width = rect.w,
        height = rect.h
    );
    Ok(Selection::Region(rect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{InputKey, PickerEvent, WindowHandle};
    use crate::geometry::{Point, Rect};
    use crate::select::{CancelKey, LineOptions, OutlineMode};
    use crate::testing::{FakeDisplay, FakeWindow, NoSleep, ROOT};

    fn drag(from: (i32, i32), to: (i32, i32)) -> Vec<PickerEvent> {
        vec![
            PickerEvent::ButtonPress(Point::new(from.0, from.1)),
            PickerEvent::Motion(Point::new(to.0, to.1)),
            PickerEvent::ButtonRelease(Point::new(to.0, to.1)),
        ]
    }

    fn assert_released_once(d: &FakeDisplay) {
        assert_eq!(d.count("ungrab_pointer"), 1);
        assert_eq!(d.count("ungrab_keyboard"), 1);
        assert_eq!(d.count("destroy_overlay"), 1);
    }

    #[test]
    fn test_drag_selects_region() {
        let d = FakeDisplay::new(1920, 1080);
        d.script(drag((100, 100), (50, 50)));

        let selection = pick_region(&d, &PickerOptions::default(), &NoSleep::default()).unwrap();

        assert_eq!(selection, Selection::Region(Rect::new(50, 50, 50, 50)));
        assert_released_once(&d);
        let calls = d.calls();
        assert!(calls.contains(&"outline 50,50,50,50".to_string()));
        assert!(calls.contains(&"glyph UpperLeft".to_string()));
        let destroy = calls.iter().position(|c| c == "destroy_overlay").unwrap();
        let poll = calls.iter().position(|c| c == "poll_unmap").unwrap();
        assert!(poll > destroy);
    }

    #[test]
    fn test_release_order() {
        let d = FakeDisplay::new(800, 600);
        d.script(drag((0, 0), (10, 10)));
        pick_region(&d, &PickerOptions::default(), &NoSleep::default()).unwrap();

        let calls = d.calls();
        let tail: Vec<&str> = calls
            .iter()
            .map(String::as_str)
            .skip_while(|c| *c != "ungrab_pointer")
            .take(4)
            .collect();
        assert_eq!(
            tail,
            [
                "ungrab_pointer",
                "ungrab_keyboard",
                "unmap_overlay",
                "destroy_overlay"
            ]
        );
    }

    #[test]
    fn test_click_picks_window_under_pointer() {
        let mut d = FakeDisplay::new(800, 600);
        d.add_window(0x20, ROOT, FakeWindow::new(0, 0, 300, 200));
        d.pointer_path = vec![WindowHandle(0x20)];
        d.script([
            PickerEvent::ButtonPress(Point::new(40, 40)),
            PickerEvent::ButtonRelease(Point::new(40, 40)),
        ]);

        let selection = pick_region(&d, &PickerOptions::default(), &NoSleep::default()).unwrap();

        assert_eq!(selection, Selection::Window(Some(WindowHandle(0x20))));
        assert_released_once(&d);
        assert_eq!(d.count("poll_unmap"), 0);
    }

    #[test]
    fn test_thin_drag_is_region_not_window() {
        let mut d = FakeDisplay::new(800, 600);
        d.add_window(0x20, ROOT, FakeWindow::new(0, 0, 300, 200));
        d.pointer_path = vec![WindowHandle(0x20)];
        d.script(drag((40, 40), (140, 40)));

        let selection = pick_region(&d, &PickerOptions::default(), &NoSleep::default()).unwrap();

        assert_eq!(selection, Selection::Region(Rect::new(40, 40, 100, 0)));
        assert_released_once(&d);
        assert_eq!(d.count("poll_unmap"), 0);
    }

    #[test]
    fn test_unexpected_key_releases_input() {
        let d = FakeDisplay::new(800, 600);
        d.script([
            PickerEvent::ButtonPress(Point::new(1, 1)),
            PickerEvent::Key(InputKey::Other(0x61)),
        ]);

        let err = pick_region(&d, &PickerOptions::default(), &NoSleep::default()).unwrap_err();

        assert!(matches!(err, SelectError::UnexpectedKey { keysym: 0x61 }));
        assert_released_once(&d);
    }

    #[test]
    fn test_cancel_releases_input() {
        let d = FakeDisplay::new(800, 600);
        d.script([PickerEvent::Key(InputKey::Other(0x71))]);
        let options = PickerOptions {
            cancel_key: Some(CancelKey::Q),
            ..Default::default()
        };

        let err = pick_region(&d, &options, &NoSleep::default()).unwrap_err();

        assert!(matches!(err, SelectError::Cancelled));
        assert_released_once(&d);
    }

    #[test]
    fn test_connection_error_releases_input() {
        let d = FakeDisplay::new(800, 600);
        d.script([PickerEvent::ButtonPress(Point::new(1, 1))]);

        let err = pick_region(&d, &PickerOptions::default(), &NoSleep::default()).unwrap_err();

        assert_eq!(
            crate::errors::SrError::error_code(&err),
            "DISPLAY_REQUEST_FAILED"
        );
        assert_released_once(&d);
    }

    #[test]
    fn test_pointer_grab_refused() {
        let mut d = FakeDisplay::new(800, 600);
        d.pointer_grab = GrabOutcome::AlreadyGrabbed;

        let err = pick_region(&d, &PickerOptions::default(), &NoSleep::default()).unwrap_err();

        assert!(matches!(err, SelectError::PointerGrabFailed { .. }));
        assert_eq!(d.count("ungrab_pointer"), 0);
        assert_eq!(d.count("grab_keyboard"), 0);
    }

    #[test]
    fn test_keyboard_grab_retries() {
        let d = FakeDisplay::new(800, 600);
        d.keyboard_grabs
            .borrow_mut()
            .extend([GrabOutcome::AlreadyGrabbed, GrabOutcome::AlreadyGrabbed]);
        d.script(drag((0, 0), (5, 5)));
        let sleeper = NoSleep::default();

        pick_region(&d, &PickerOptions::default(), &sleeper).unwrap();

        assert_eq!(d.count("grab_keyboard"), 3);
        assert_eq!(sleeper.sleeps.get(), 2);
    }

    #[test]
    fn test_keyboard_grab_gives_up() {
        let d = FakeDisplay::new(800, 600);
        d.keyboard_grabs
            .borrow_mut()
            .extend(std::iter::repeat_n(GrabOutcome::AlreadyGrabbed, 25));

        let err = pick_region(&d, &PickerOptions::default(), &NoSleep::default()).unwrap_err();

        assert!(matches!(err, SelectError::KeyboardGrabFailed { .. }));
        assert_eq!(d.count("grab_keyboard"), 20);
        assert_eq!(d.count("ungrab_pointer"), 1);
        assert_eq!(d.count("ungrab_keyboard"), 0);
        assert_eq!(d.count("destroy_overlay"), 0);
    }

    #[test]
    fn test_keyboard_grab_denied_fails_fast() {
        let d = FakeDisplay::new(800, 600);
        d.keyboard_grabs
            .borrow_mut()
            .push_back(GrabOutcome::Denied("frozen".to_string()));

        let err = pick_region(&d, &PickerOptions::default(), &NoSleep::default()).unwrap_err();

        assert!(matches!(err, SelectError::KeyboardGrabFailed { ref reason } if reason == "frozen"));
        assert_eq!(d.count("grab_keyboard"), 1);
        assert_eq!(d.count("ungrab_pointer"), 1);
    }

    #[test]
    fn test_unmap_wait_is_soft() {
        let d = FakeDisplay::new(800, 600);
        d.unmap_after.set(None);
        d.script(drag((0, 0), (5, 5)));

        let selection = pick_region(&d, &PickerOptions::default(), &NoSleep::default()).unwrap();

        assert_eq!(selection, Selection::Region(Rect::new(0, 0, 5, 5)));
        assert_eq!(d.count("poll_unmap"), 30);
    }

    #[test]
    fn test_overlay_uses_line_mode() {
        let d = FakeDisplay::new(800, 600);
        d.script(drag((0, 0), (5, 5)));
        let options = PickerOptions {
            line: LineOptions {
                mode: OutlineMode::Classic,
                ..Default::default()
            },
            cancel_key: None,
        };

        pick_region(&d, &options, &NoSleep::default()).unwrap();

        assert!(d.calls().contains(&"create_overlay Classic".to_string()));
    }
}
