use std::fmt;
use std::path::PathBuf;

use crate::geometry::Rect;

/// Request to capture a clipped screen region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    /// Region in root coordinates, already clipped
    pub region: Rect,
    /// Composite the mouse cursor onto the image
    pub include_cursor: bool,
}

impl CaptureRequest {
    pub fn new(region: Rect) -> Self {
        Self {
            region,
            include_cursor: false,
        }
    }

    pub fn with_cursor(mut self, include_cursor: bool) -> Self {
        self.include_cursor = include_cursor;
        self
    }
}

/// Result of a screenshot capture
#[derive(Debug)]
pub struct CaptureResult {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl CaptureResult {
    /// Create a new capture result. Internal use only.
    pub(crate) fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert!(width > 0, "Width must be positive");
        debug_assert!(height > 0, "Height must be positive");
        debug_assert!(!data.is_empty(), "Data must not be empty");

        Self {
            width,
            height,
            data,
        }
    }

    /// Image width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// PNG-encoded bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Where the PNG goes; `-` means standard output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl From<&str> for OutputTarget {
    fn from(value: &str) -> Self {
        if value == "-" {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(PathBuf::from(value))
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Stdout => write!(f, "<stdout>"),
            OutputTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}
