mod errors;
mod handler;
mod types;

pub use errors::ScreenshotError;
pub use handler::{capture, compose_cursor, encode_png, take_screenshot, write_output};
pub use types::{CaptureRequest, CaptureResult, OutputTarget};
