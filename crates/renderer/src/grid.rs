//! Grid line layout over the displayed image

use pixel_overlay_imaging::ImageSize;

/// Tolerance, in cells, for including the final boundary line despite float rounding
const BOUNDARY_EPSILON: f64 = 1e-9;

/// Above this many lines per axis the cells are too dense to draw
const MAX_LINES_PER_AXIS: u64 = 1 << 16;

/// Grid lines over the scaled image, in displayed pixels.
///
/// Lines are spaced `pixel_size * scale` apart starting at 0, and the line on
/// the far boundary is included when it lands on it.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    /// Scaled image width
    pub width: f64,
    /// Scaled image height
    pub height: f64,
    pub spacing: f64,
    /// X offsets of vertical lines
    pub vertical: Vec<f64>,
    /// Y offsets of horizontal lines
    pub horizontal: Vec<f64>,
}

impl GridLayout {
    pub fn compute(natural: ImageSize, pixel_size: u32, scale: f64) -> Self {
        let width = natural.width as f64 * scale;
        let height = natural.height as f64 * scale;
        let spacing = pixel_size as f64 * scale;
        Self {
            width,
            height,
            spacing,
            vertical: line_offsets(width, spacing),
            horizontal: line_offsets(height, spacing),
        }
    }

    pub fn line_count(&self) -> usize {
        self.vertical.len() + self.horizontal.len()
    }
}

fn line_offsets(extent: f64, spacing: f64) -> Vec<f64> {
    if !(spacing > 0.0 && spacing.is_finite() && extent.is_finite() && extent >= 0.0) {
        return Vec::new();
    }
    let cells = (extent / spacing + BOUNDARY_EPSILON).floor();
    if !cells.is_finite() || cells >= MAX_LINES_PER_AXIS as f64 {
        tracing::warn!("Skipping grid with {} cells per axis", cells);
        return Vec::new();
    }
    (0..=cells as u64).map(|i| i as f64 * spacing).collect()
}
