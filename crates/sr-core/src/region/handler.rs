use tracing::{debug, info};

use super::errors::RegionError;
use super::types::{ResolveOptions, SelectionMode};
use crate::display::{InputSurface, Sleeper, WindowQueries};
use crate::geometry::{Rect, clip, monitor_at};
use crate::select::{Selection, pick_region};
use crate::window::{WindowRectOptions, window_rect};

/// Parse `X,Y,W,H` into a rectangle. Only the format is checked here.
pub fn parse_rect(input: &str) -> Result<Rect, RegionError> {
    let invalid = |reason: String| RegionError::InvalidRectFormat {
        input: input.to_string(),
        reason,
    };

    let fields: Vec<&str> = input.split(',').collect();
    if fields.len() != 4 {
        return Err(invalid(format!(
            "expected 4 comma-separated integers, got {}",
            fields.len()
        )));
    }

    let mut values = [0i32; 4];
    for (value, field) in values.iter_mut().zip(&fields) {
        *value = field
            .trim()
            .parse()
            .map_err(|e| invalid(format!("'{}': {}", field, e)))?;
    }

    let [x, y, w, h] = values;
    Ok(Rect::new(x, y, w, h))
}

/// Turn a selection mode into a screen rectangle, clipped to the screen.
///
/// The result can still be degenerate when the requested area lies entirely
/// off screen.
pub fn resolve<B>(
    backend: &B,
    mode: &SelectionMode,
    options: &ResolveOptions,
    sleeper: &dyn Sleeper,
) -> Result<Rect, RegionError>
where
    B: WindowQueries + InputSurface,
{
    info!(event = "core.region.resolve_started", mode = ?mode);

    let screen = backend.screen();
    let window_options = WindowRectOptions {
        include_border: options.include_border,
    };

    let rect = match *mode {
        SelectionMode::FullScreen => screen.bounds(),
        SelectionMode::ExplicitRect(rect) => {
            if rect.w <= 0 || rect.h <= 0 {
                return Err(RegionError::InvalidRect {
                    width: rect.w,
                    height: rect.h,
                });
            }
            rect
        }
        SelectionMode::FocusedWindow => {
            let focus = backend.input_focus()?;
            debug!(event = "core.region.focus_resolved", window = %focus);
            window_rect(backend, focus, window_options, sleeper)?
        }
        SelectionMode::Monitor => {
            let monitors = backend.monitors()?;
            let pointer = backend.pointer_position()?;
            match monitor_at(&monitors, pointer) {
                Some(monitor) => {
                    debug!(event = "core.region.monitor_resolved", index = monitor.index);
                    monitor.bounds()
                }
                None => {
                    debug!(
                        event = "core.region.monitor_fallback",
                        monitors = monitors.len(),
                        x = pointer.x,
                        y = pointer.y
                    );
                    screen.bounds()
                }
            }
        }
        SelectionMode::InteractiveSelect => {
            match pick_region(backend, &options.picker, sleeper)? {
                Selection::Region(rect) => rect,
                Selection::Window(Some(window)) => {
                    window_rect(backend, window, window_options, sleeper)?
                }
                Selection::Window(None) => screen.bounds(),
            }
        }
    };

    let clipped = clip(rect, screen);
    info!(
        event = "core.region.resolve_completed",
        x = clipped.x,
        y = clipped.y,
        width = clipped.w,
        height = clipped.h
    );
    Ok(clipped)
}
