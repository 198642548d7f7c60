mod errors;
mod handler;
mod state;
mod types;

pub use errors::SelectError;
pub use handler::pick_region;
pub use state::{DragPhase, DragState, Transition};
pub use types::{CancelKey, LineOptions, LineStyle, OutlineMode, PickerOptions, Selection};
