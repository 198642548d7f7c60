mod handler;
mod types;

pub use handler::{clip, monitor_at};
pub use types::{MonitorInfo, Point, Rect, ScreenInfo};
