//! Type definitions for IPC messages.

mod raster;
mod state;

pub use raster::*;
pub use state::*;
