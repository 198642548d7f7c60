use super::errors::SelectError;
use super::types::CancelKey;
use crate::display::{CursorGlyph, InputKey, PickerEvent};
use crate::geometry::{Point, Rect, ScreenInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Pressed,
    Dragging,
    Released,
}

/// What the picker loop has to do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Ignored,
    /// Button went down at this point
    Pressed(Point),
    /// Outline must be redrawn; `glyph` is set when the drag quadrant changed
    Redraw {
        rect: Rect,
        glyph: Option<CursorGlyph>,
    },
    /// Terminal; button released without any motion
    Clicked,
    /// Terminal; the rectangle is normalized but may be degenerate
    Released(Rect),
}

/// Rubber-band selection state.
///
/// `current` keeps the sign of the drag until it is handed out.
#[derive(Debug, Clone)]
pub struct DragState {
    phase: DragPhase,
    anchor: Point,
    current: Rect,
    glyph: CursorGlyph,
    screen: ScreenInfo,
}

impl DragState {
    pub fn new(screen: ScreenInfo) -> Self {
        Self {
            phase: DragPhase::Idle,
            anchor: Point::default(),
            current: Rect::default(),
            glyph: CursorGlyph::Crosshair,
            screen,
        }
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    pub fn current(&self) -> Rect {
        self.current
    }

    pub fn handle(
        &mut self,
        event: PickerEvent,
        cancel: Option<CancelKey>,
    ) -> Result<Transition, SelectError> {
        if self.phase == DragPhase::Released {
            return Ok(Transition::Ignored);
        }

        match event {
            PickerEvent::ButtonPress(point) => {
                if self.phase != DragPhase::Idle {
                    return Ok(Transition::Ignored);
                }
                self.phase = DragPhase::Pressed;
                self.anchor = point;
                self.current = Rect::new(point.x, point.y, 0, 0);
                Ok(Transition::Pressed(point))
            }
            PickerEvent::Motion(point) => {
                if self.phase == DragPhase::Idle {
                    return Ok(Transition::Ignored);
                }
                self.phase = DragPhase::Dragging;
                self.current = Rect::from_corners(self.anchor, point);

                let glyph = CursorGlyph::for_drag(self.anchor, point);
                let changed = glyph != self.glyph;
                self.glyph = glyph;
                Ok(Transition::Redraw {
                    rect: self.current.normalized(),
                    glyph: changed.then_some(glyph),
                })
            }
            PickerEvent::ButtonRelease(_) => {
                // A release without a press belongs to a click made before the grab
                if self.phase == DragPhase::Idle {
                    return Ok(Transition::Ignored);
                }
                let dragged = self.phase == DragPhase::Dragging;
                self.phase = DragPhase::Released;
                if dragged {
                    Ok(Transition::Released(self.current.normalized()))
                } else {
                    Ok(Transition::Clicked)
                }
            }
            PickerEvent::Key(key) => self.handle_key(key, cancel),
        }
    }

    fn handle_key(
        &mut self,
        key: InputKey,
        cancel: Option<CancelKey>,
    ) -> Result<Transition, SelectError> {
        let rect = &mut self.current;
        match key {
            InputKey::Other(keysym) => {
                if cancel.is_some_and(|c| c.keysym() == keysym) {
                    return Err(SelectError::Cancelled);
                }
                return Err(SelectError::UnexpectedKey { keysym });
            }
            _ if self.phase == DragPhase::Idle => return Ok(Transition::Ignored),
            // Each edge is clamped on its own
            InputKey::Left => rect.x = (rect.x - 1).max(0),
            InputKey::Right => rect.x = (rect.x + 1).min(self.screen.width),
            InputKey::Up => rect.y = (rect.y - 1).max(0),
            InputKey::Down => rect.y = (rect.y + 1).min(self.screen.height),
        }

        Ok(Transition::Redraw {
            rect: self.current.normalized(),
            glyph: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> ScreenInfo {
        ScreenInfo::new(1920, 1080)
    }

    fn press(state: &mut DragState, x: i32, y: i32) -> Transition {
        state
            .handle(PickerEvent::ButtonPress(Point::new(x, y)), None)
            .unwrap()
    }

    fn motion(state: &mut DragState, x: i32, y: i32) -> Transition {
        state
            .handle(PickerEvent::Motion(Point::new(x, y)), None)
            .unwrap()
    }

    fn key(state: &mut DragState, key: InputKey) -> Result<Transition, SelectError> {
        state.handle(PickerEvent::Key(key), Some(CancelKey::Escape))
    }

    #[test]
    fn test_drag_phases() {
        let mut state = DragState::new(screen());
        assert_eq!(state.phase(), DragPhase::Idle);

        assert_eq!(press(&mut state, 10, 10), Transition::Pressed(Point::new(10, 10)));
        assert_eq!(state.phase(), DragPhase::Pressed);

        motion(&mut state, 20, 30);
        assert_eq!(state.phase(), DragPhase::Dragging);

        let t = state
            .handle(PickerEvent::ButtonRelease(Point::new(20, 30)), None)
            .unwrap();
        assert_eq!(t, Transition::Released(Rect::new(10, 10, 10, 20)));
        assert_eq!(state.phase(), DragPhase::Released);
        assert_eq!(motion(&mut state, 50, 50), Transition::Ignored);
    }

    #[test]
    fn test_release_without_motion_is_click() {
        let mut state = DragState::new(screen());
        press(&mut state, 10, 10);
        key(&mut state, InputKey::Right).unwrap();
        let t = state
            .handle(PickerEvent::ButtonRelease(Point::new(10, 10)), None)
            .unwrap();
        assert_eq!(t, Transition::Clicked);
        assert_eq!(state.phase(), DragPhase::Released);
    }

    #[test]
    fn test_thin_drag_is_not_a_click() {
        let mut state = DragState::new(screen());
        press(&mut state, 10, 10);
        motion(&mut state, 60, 10);
        let t = state
            .handle(PickerEvent::ButtonRelease(Point::new(60, 10)), None)
            .unwrap();
        assert_eq!(t, Transition::Released(Rect::new(10, 10, 50, 0)));
    }

    #[test]
    fn test_backwards_drag_normalizes() {
        let mut state = DragState::new(screen());
        press(&mut state, 100, 100);
        let t = motion(&mut state, 50, 50);
        assert_eq!(
            t,
            Transition::Redraw {
                rect: Rect::new(50, 50, 50, 50),
                glyph: Some(CursorGlyph::UpperLeft),
            }
        );
        assert_eq!(state.current(), Rect::new(100, 100, -50, -50));
        assert_eq!(state.anchor(), Point::new(100, 100));
    }

    #[test]
    fn test_glyph_only_reported_on_quadrant_change() {
        let mut state = DragState::new(screen());
        press(&mut state, 100, 100);
        let first = motion(&mut state, 150, 150);
        let second = motion(&mut state, 160, 170);
        let third = motion(&mut state, 160, 20);
        assert!(matches!(
            first,
            Transition::Redraw {
                glyph: Some(CursorGlyph::LowerRight),
                ..
            }
        ));
        assert!(matches!(second, Transition::Redraw { glyph: None, .. }));
        assert!(matches!(
            third,
            Transition::Redraw {
                glyph: Some(CursorGlyph::UpperRight),
                ..
            }
        ));
    }

    #[test]
    fn test_motion_and_release_before_press_ignored() {
        let mut state = DragState::new(screen());
        assert_eq!(motion(&mut state, 5, 5), Transition::Ignored);
        let t = state
            .handle(PickerEvent::ButtonRelease(Point::new(5, 5)), None)
            .unwrap();
        assert_eq!(t, Transition::Ignored);
        assert_eq!(state.phase(), DragPhase::Idle);
    }

    #[test]
    fn test_nudges_move_current_origin() {
        let mut state = DragState::new(screen());
        press(&mut state, 10, 10);
        motion(&mut state, 110, 60);

        key(&mut state, InputKey::Right).unwrap();
        key(&mut state, InputKey::Down).unwrap();
        assert_eq!(state.current(), Rect::new(11, 11, 100, 50));

        key(&mut state, InputKey::Left).unwrap();
        let t = key(&mut state, InputKey::Up).unwrap();
        assert_eq!(
            t,
            Transition::Redraw {
                rect: Rect::new(10, 10, 100, 50),
                glyph: None,
            }
        );
    }

    #[test]
    fn test_nudges_clamp_to_screen() {
        let mut state = DragState::new(screen());
        press(&mut state, 0, 0);
        key(&mut state, InputKey::Left).unwrap();
        key(&mut state, InputKey::Up).unwrap();
        assert_eq!(state.current(), Rect::new(0, 0, 0, 0));

        let mut state = DragState::new(screen());
        press(&mut state, 1920, 1080);
        key(&mut state, InputKey::Right).unwrap();
        key(&mut state, InputKey::Down).unwrap();
        assert_eq!(state.current(), Rect::new(1920, 1080, 0, 0));
    }

    #[test]
    fn test_arrow_before_press_ignored() {
        let mut state = DragState::new(screen());
        assert_eq!(key(&mut state, InputKey::Left).unwrap(), Transition::Ignored);
    }

    #[test]
    fn test_other_key_is_fatal() {
        let mut state = DragState::new(screen());
        press(&mut state, 0, 0);
        let err = key(&mut state, InputKey::Other(0x61)).unwrap_err();
        assert!(matches!(err, SelectError::UnexpectedKey { keysym: 0x61 }));
    }

    #[test]
    fn test_cancel_key() {
        let mut state = DragState::new(screen());
        let err = key(&mut state, InputKey::Other(0xff1b)).unwrap_err();
        assert!(matches!(err, SelectError::Cancelled));

        let mut state = DragState::new(screen());
        let err = state
            .handle(PickerEvent::Key(InputKey::Other(0xff1b)), None)
            .unwrap_err();
        assert!(matches!(err, SelectError::UnexpectedKey { .. }));
    }
}
