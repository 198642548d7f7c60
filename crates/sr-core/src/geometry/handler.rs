use tracing::debug;

use super::types::{MonitorInfo, Point, Rect, ScreenInfo};

/// Clip a rectangle to the visible screen.
///
/// Never fails. A rectangle lying entirely off screen comes back with a zero
/// or negative width/height; callers reject that before capturing.
pub fn clip(rect: Rect, screen: ScreenInfo) -> Rect {
    // Far edges of an i32 rectangle do not fit in i32
    let (mut x, mut y) = (i64::from(rect.x), i64::from(rect.y));
    let (mut w, mut h) = (i64::from(rect.w), i64::from(rect.h));
    let (width, height) = (i64::from(screen.width), i64::from(screen.height));

    if x < 0 {
        w += x;
        x = 0;
    }
    if y < 0 {
        h += y;
        y = 0;
    }
    if x + w > width {
        w = width - x;
    }
    if y + h > height {
        h = height - y;
    }

    let out = Rect::new(narrow(x), narrow(y), narrow(w), narrow(h));
    if out != rect {
        debug!(
            event = "core.geometry.clip_applied",
            before = ?rect,
            after = ?out
        );
    }
    out
}

fn narrow(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Find the monitor whose bounds contain `point`
pub fn monitor_at(monitors: &[MonitorInfo], point: Point) -> Option<&MonitorInfo> {
    monitors.iter().find(|m| m.bounds().contains(point))
}
