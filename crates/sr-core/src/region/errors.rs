use crate::display::DisplayError;
use crate::errors::SrError;
use crate::select::SelectError;
use crate::window::WindowError;

#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    #[error("Invalid rectangle '{input}': {reason}")]
    InvalidRectFormat { input: String, reason: String },

    #[error("Rectangle must have a positive size, got {width}x{height}")]
    InvalidRect { width: i32, height: i32 },

    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Select(#[from] SelectError),

    #[error(transparent)]
    Display(#[from] DisplayError),
}

impl SrError for RegionError {
    fn error_code(&self) -> &'static str {
        match self {
            RegionError::InvalidRectFormat { .. } => "INVALID_RECT_FORMAT",
            RegionError::InvalidRect { .. } => "INVALID_RECT",
            RegionError::Window(e) => e.error_code(),
            RegionError::Select(e) => e.error_code(),
            RegionError::Display(e) => e.error_code(),
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            RegionError::InvalidRectFormat { .. } | RegionError::InvalidRect { .. } => true,
            RegionError::Window(e) => e.is_user_error(),
            RegionError::Select(e) => e.is_user_error(),
            RegionError::Display(e) => e.is_user_error(),
        }
    }
}
