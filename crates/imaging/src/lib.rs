//! Pixel overlay imaging - raster codec, pixelizer and palette quantizer
//!
//! This crate provides the image pipeline run by the control panel:
//! - [`raster`] - data URL decode/encode of RGBA rasters
//! - [`pixelize`] - point-sampled downsample and nearest-neighbour upscale
//! - [`palette`] - palette text parsing and nearest-color quantization
//! - [`detect`] - best-effort block size estimation from a page capture

pub mod detect;
pub mod palette;
pub mod pixelize;
pub mod raster;

pub use detect::*;
pub use palette::*;
pub use pixelize::*;
pub use raster::*;
