use crate::display::DisplayError;
use crate::errors::SrError;
use crate::window::WindowError;

#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error("Unable to grab the pointer: {reason}")]
    PointerGrabFailed { reason: String },

    #[error("Unable to grab the keyboard: {reason}")]
    KeyboardGrabFailed { reason: String },

    #[error("Key pressed during selection (keysym {keysym:#x})")]
    UnexpectedKey { keysym: u32 },

    #[error("Selection cancelled")]
    Cancelled,

    #[error("Invalid line option '{input}': {reason}")]
    InvalidLineOption { input: String, reason: String },

    #[error("Invalid cancel key '{input}'")]
    InvalidCancelKey { input: String },

    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Display(#[from] DisplayError),
}

impl SrError for SelectError {
    fn error_code(&self) -> &'static str {
        match self {
            SelectError::PointerGrabFailed { .. } => "POINTER_GRAB_FAILED",
            SelectError::KeyboardGrabFailed { .. } => "KEYBOARD_GRAB_FAILED",
            SelectError::UnexpectedKey { .. } => "SELECTION_KEY_PRESSED",
            SelectError::Cancelled => "SELECTION_CANCELLED",
            SelectError::InvalidLineOption { .. } => "INVALID_LINE_OPTION",
            SelectError::InvalidCancelKey { .. } => "INVALID_CANCEL_KEY",
            SelectError::Window(e) => e.error_code(),
            SelectError::Display(e) => e.error_code(),
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            SelectError::UnexpectedKey { .. }
            | SelectError::Cancelled
            | SelectError::InvalidLineOption { .. }
            | SelectError::InvalidCancelKey { .. } => true,
            SelectError::PointerGrabFailed { .. } | SelectError::KeyboardGrabFailed { .. } => {
                false
            }
            SelectError::Window(e) => e.is_user_error(),
            SelectError::Display(e) => e.is_user_error(),
        }
    }
}
