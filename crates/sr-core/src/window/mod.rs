mod errors;
mod handler;
mod types;

pub use errors::WindowError;
pub use handler::{find_frame, get_client_window, innermost_window_at_pointer, window_rect};
pub use types::{FrameInfo, WindowRectOptions};
