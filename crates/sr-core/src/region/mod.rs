mod errors;
mod handler;
mod types;

pub use errors::RegionError;
pub use handler::{parse_rect, resolve};
pub use types::{ResolveOptions, SelectionMode};
