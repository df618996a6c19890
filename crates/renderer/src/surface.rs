//! Presentation surface driven by the renderer

use pixel_overlay_ipc::{Position, RasterData};

use crate::grid::GridLayout;

/// The page-side overlay element the renderer drives.
///
/// Implementations own the actual element tree; the renderer only tells them
/// what to show.
pub trait OverlaySurface {
    /// Replace the displayed raster, or clear it
    fn set_source(&mut self, raster: Option<&RasterData>);

    /// Apply opacity and a top-left anchored scale
    fn apply_transform(&mut self, opacity: f64, scale: f64);

    fn set_position(&mut self, position: Position);

    fn set_visible(&mut self, visible: bool);

    /// Show the given grid, or hide the grid layer
    fn set_grid(&mut self, grid: Option<&GridLayout>);
}

/// What a surface currently presents
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    pub source: Option<RasterData>,
    pub opacity: f64,
    pub scale: f64,
    pub position: Position,
    pub visible: bool,
    pub grid: Option<GridLayout>,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            source: None,
            opacity: 1.0,
            scale: 1.0,
            position: Position::default(),
            visible: false,
            grid: None,
        }
    }
}

/// Surface that only records the presentation, for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    presentation: Presentation,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }
}

impl OverlaySurface for HeadlessSurface {
    fn set_source(&mut self, raster: Option<&RasterData>) {
        self.presentation.source = raster.cloned();
    }

    fn apply_transform(&mut self, opacity: f64, scale: f64) {
        self.presentation.opacity = opacity;
        self.presentation.scale = scale;
    }

    fn set_position(&mut self, position: Position) {
        self.presentation.position = position;
    }

    fn set_visible(&mut self, visible: bool) {
        self.presentation.visible = visible;
    }

    fn set_grid(&mut self, grid: Option<&GridLayout>) {
        self.presentation.grid = grid.cloned();
    }
}
