use crate::errors::SrError;

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("Unable to open display '{display}': {message}")]
    ConnectFailed { display: String, message: String },

    #[error("X request {request} failed: {message}")]
    RequestFailed {
        request: &'static str,
        message: String,
    },

    #[error("X server does not support the {name} extension")]
    ExtensionMissing { name: &'static str },
}

impl DisplayError {
    /// Adapter for `map_err` on x11rb results
    pub(crate) fn request<E: std::fmt::Display>(request: &'static str) -> impl FnOnce(E) -> Self {
        move |e| DisplayError::RequestFailed {
            request,
            message: e.to_string(),
        }
    }
}

impl SrError for DisplayError {
    fn error_code(&self) -> &'static str {
        match self {
            DisplayError::ConnectFailed { .. } => "DISPLAY_UNAVAILABLE",
            DisplayError::RequestFailed { .. } => "DISPLAY_REQUEST_FAILED",
            DisplayError::ExtensionMissing { .. } => "DISPLAY_EXTENSION_MISSING",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, DisplayError::ConnectFailed { .. })
    }
}
