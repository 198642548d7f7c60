use crate::display::{DisplayError, WindowHandle};
use crate::errors::SrError;

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("Window no longer exists: {id}")]
    NotFound { id: WindowHandle },

    #[error("Window is not viewable: {id}")]
    NotViewable { id: WindowHandle },

    #[error(transparent)]
    Display(#[from] DisplayError),
}

impl SrError for WindowError {
    fn error_code(&self) -> &'static str {
        match self {
            WindowError::NotFound { .. } => "WINDOW_NOT_FOUND",
            WindowError::NotViewable { .. } => "WINDOW_NOT_VIEWABLE",
            WindowError::Display(e) => e.error_code(),
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            WindowError::NotFound { .. } | WindowError::NotViewable { .. } => true,
            WindowError::Display(e) => e.is_user_error(),
        }
    }
}
