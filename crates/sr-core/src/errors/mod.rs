use std::error::Error;

/// Base trait for all sr errors
pub trait SrError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling
    fn error_code(&self) -> &'static str;

    /// Whether this error was caused by user input rather than the system
    fn is_user_error(&self) -> bool {
        false
    }
}

/// Common result type for the application
pub type SrResult<T> = Result<T, Box<dyn SrError>>;
