use crate::errors::SrError;
use crate::region::RegionError;

#[derive(Debug, thiserror::Error)]
pub enum ScreenshotError {
    #[error("Nothing to capture: region is {width}x{height} after clipping to the screen")]
    EmptyRegion { width: i32, height: i32 },

    #[error("Screenshot capture failed: {0}")]
    CaptureFailed(String),

    #[error("Image encoding failed: {0}")]
    EncodingError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Region(#[from] RegionError),
}

impl SrError for ScreenshotError {
    fn error_code(&self) -> &'static str {
        match self {
            ScreenshotError::EmptyRegion { .. } => "SCREENSHOT_EMPTY_REGION",
            ScreenshotError::CaptureFailed(_) => "SCREENSHOT_CAPTURE_FAILED",
            ScreenshotError::EncodingError(_) => "SCREENSHOT_ENCODING_FAILED",
            ScreenshotError::Io(_) => "SCREENSHOT_IO_ERROR",
            ScreenshotError::Region(e) => e.error_code(),
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            ScreenshotError::EmptyRegion { .. } => true,
            ScreenshotError::Region(e) => e.is_user_error(),
            _ => false,
        }
    }
}
