mod connection;
mod errors;
mod input;
mod traits;
mod types;
mod wait;

pub use connection::{DisplayConnection, ServerGrab};
pub use errors::DisplayError;
pub use traits::{DisplayBackend, FrameSource, InputSurface, WindowQueries};
pub use types::{
    CursorGlyph, CursorImage, GrabOutcome, InputKey, PickerEvent, WindowAttributes, WindowHandle,
    WindowTree,
};
pub use wait::{
    EVENT_SETTLE_BUDGET, KEYBOARD_GRAB_BUDGET, PollBudget, Sleeper, ThreadSleeper, wait_for,
};
