use tracing::{error, info};

use crate::errors::SrError;

pub fn log_app_startup() {
    info!(
        event = "core.app.startup_completed",
        version = env!("CARGO_PKG_VERSION")
    );
}

/// Record a terminal error with its code and classification
pub fn log_app_error<E: SrError + ?Sized>(error: &E) {
    error!(
        event = "core.app.error_occurred",
        error_code = error.error_code(),
        user_error = error.is_user_error(),
        error = %error
    );
}
