//! The persisted and transmitted overlay snapshot.

use pixel_overlay_config::{DEFAULT_OPACITY, DEFAULT_PIXEL_SIZE, DEFAULT_POSITION, DEFAULT_SCALE};
use serde::{Deserialize, Serialize};

use super::RasterData;

/// Viewport-relative overlay position in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(DEFAULT_POSITION.0, DEFAULT_POSITION.1)
    }
}

/// The single snapshot stored under `overlayState`.
///
/// Missing fields in a stored record are filled from the defaults, so an
/// older or partial record always loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayState {
    /// Currently displayed (possibly pixelized) raster
    pub image_data: Option<RasterData>,
    /// Unmodified user image; never replaced by a derived raster
    pub original_image_data: Option<RasterData>,
    /// Opacity (0.0-1.0)
    pub opacity: f64,
    /// Display scale (1.0 = natural size)
    pub scale: f64,
    pub position: Position,
    pub visible: bool,
    pub has_image: bool,
    /// Block side length in source pixels; 0 disables pixelization
    pub pixel_size: u32,
    pub pixelize_enabled: bool,
    pub grid_enabled: bool,
    pub custom_palette_enabled: bool,
    /// Comma-separated hex colors, re-parsed on every use
    pub custom_palette: String,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            image_data: None,
            original_image_data: None,
            opacity: DEFAULT_OPACITY,
            scale: DEFAULT_SCALE,
            position: Position::default(),
            visible: false,
            has_image: false,
            pixel_size: DEFAULT_PIXEL_SIZE,
            pixelize_enabled: false,
            grid_enabled: false,
            custom_palette_enabled: false,
            custom_palette: String::new(),
        }
    }
}

impl OverlayState {
    /// The raster re-pixelization should start from
    pub fn source_raster(&self) -> Option<&RasterData> {
        self.original_image_data.as_ref().or(self.image_data.as_ref())
    }

    /// Whether a stored image should be decoded on startup
    pub fn should_restore(&self) -> bool {
        self.has_image && self.image_data.is_some()
    }
}
