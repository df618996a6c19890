//! Shared configuration for the pixel overlay
//!
//! This crate is the single source of truth for the snapshot defaults, the
//! control panel's input ranges, the built-in palettes, and the runtime
//! settings read from the environment.

mod palettes;
mod runtime;

pub use palettes::PalettePreset;
pub use runtime::{AppConfig, DragPersistPolicy};

/// Default overlay opacity (0.0-1.0)
pub const DEFAULT_OPACITY: f64 = 0.5;

/// Default display scale (1.0 = natural size)
pub const DEFAULT_SCALE: f64 = 1.0;

/// Default overlay position in viewport pixels
pub const DEFAULT_POSITION: (i32, i32) = (100, 100);

/// Default pixelization block size
pub const DEFAULT_PIXEL_SIZE: u32 = 16;

/// Storage key of the single persisted snapshot
pub const OVERLAY_STATE_KEY: &str = "overlayState";

/// Inclusive integer range of a control panel input, with its reset value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRange {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

impl ControlRange {
    /// Clamp a user-supplied value into the range
    pub fn clamp(&self, value: u32) -> u32 {
        value.clamp(self.min, self.max)
    }

    /// Clamp a possibly-fractional value, falling back to the default for NaN
    pub fn clamp_f64(&self, value: f64) -> u32 {
        if value.is_nan() {
            return self.default;
        }
        value.round().clamp(self.min as f64, self.max as f64) as u32
    }
}

/// Opacity slider, in percent
pub const OPACITY_PERCENT: ControlRange = ControlRange {
    min: 0,
    max: 100,
    default: 50,
};

/// Scale slider, in percent
pub const SCALE_PERCENT: ControlRange = ControlRange {
    min: 10,
    max: 1000,
    default: 100,
};

/// Pixel size slider, in source pixels
pub const PIXEL_SIZE: ControlRange = ControlRange {
    min: 1,
    max: 128,
    default: DEFAULT_PIXEL_SIZE,
};
