//! Core of the `sr` screenshot tool: region resolution, the interactive
//! picker, window-manager frame handling and the capture pipeline for X11.

pub mod display;
pub mod errors;
pub mod events;
pub mod geometry;
pub mod logging;
pub mod region;
pub mod screenshot;
pub mod select;
pub mod window;

#[cfg(test)]
mod testing;

pub use logging::init_logging;
