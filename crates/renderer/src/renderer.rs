//! Overlay state machine
//!
//! States: `Uninitialized -> Hidden(no image) -> Hidden(has image) <-> Visible`.
//! Every transition ends with a write of the full snapshot to the store.
//!
//! Decoding a raster is the only suspending step. Each decode is tagged with
//! a [`DecodeTicket`]; only the most recent ticket may complete, so a stale
//! decode can never overwrite newer state. A `setImage` is staged until its
//! decode succeeds; a failed decode leaves the previous overlay untouched.

use pixel_overlay_config::DragPersistPolicy;
use pixel_overlay_imaging::{ImageSize, RasterError};
use pixel_overlay_ipc::{
    CommandReply, OverlayCommand, OverlayState, PixelSizeReply, Position, RasterData,
    SetImageRequest,
};
use pixel_overlay_store::StateStore;
use tracing::{debug, info, warn};

use crate::detector::{NoDetector, PixelSizeDetector};
use crate::drag::{DragTarget, DragTracker};
use crate::grid::GridLayout;
use crate::surface::OverlaySurface;

/// Monotonic identifier of one decode request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecodeTicket(u64);

/// A raster the host must decode and report back via [`OverlayRenderer::finish_decode`]
#[derive(Debug, Clone)]
pub struct DecodeRequest {
    pub ticket: DecodeTicket,
    pub raster: RasterData,
}

/// Result of handling one command
#[derive(Debug, Default)]
pub struct HandleOutcome {
    /// Decode the host must start
    pub decode: Option<DecodeRequest>,
    /// Reply for commands that expect one
    pub reply: Option<CommandReply>,
}

/// Observable lifecycle phase of the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererPhase {
    /// Store not read yet
    Uninitialized,
    Hidden { has_image: bool },
    Visible,
}

/// A `setImage` waiting for its decode.
///
/// Updates that arrive meanwhile are folded in so the commit does not undo them.
struct StagedImage {
    request: SetImageRequest,
    pixelize: bool,
    visible: bool,
}

enum DecodeKind {
    SetImage(Box<StagedImage>),
    Restore,
}

struct PendingDecode {
    ticket: DecodeTicket,
    kind: DecodeKind,
}

/// Page-side overlay renderer
pub struct OverlayRenderer<S, F> {
    state: OverlayState,
    store: S,
    surface: F,
    detector: Box<dyn PixelSizeDetector + Send>,
    drag: DragTracker,
    drag_policy: DragPersistPolicy,
    image_drag: bool,
    /// Natural size of the raster on the surface, once decoded
    natural_size: Option<ImageSize>,
    pending: Option<PendingDecode>,
    last_ticket: u64,
    initialized: bool,
    /// Whether the surface is currently showing the overlay
    shown: bool,
}

impl<S: StateStore, F: OverlaySurface> std::fmt::Debug for OverlayRenderer<S, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayRenderer")
            .field("phase", &self.phase())
            .field("natural_size", &self.natural_size)
            .field("pending", &self.pending.as_ref().map(|p| p.ticket))
            .field("dragging", &self.drag.is_dragging())
            .finish()
    }
}

fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        return OverlayState::default().opacity;
    }
    opacity.clamp(0.0, 1.0)
}

fn valid_scale(scale: f64) -> bool {
    scale.is_finite() && scale > 0.0
}

impl<S: StateStore, F: OverlaySurface> OverlayRenderer<S, F> {
    pub fn new(store: S, surface: F) -> Self {
        Self {
            state: OverlayState::default(),
            store,
            surface,
            detector: Box::new(NoDetector),
            drag: DragTracker::new(),
            drag_policy: DragPersistPolicy::default(),
            image_drag: true,
            natural_size: None,
            pending: None,
            last_ticket: 0,
            initialized: false,
            shown: false,
        }
    }

    pub fn with_detector(mut self, detector: impl PixelSizeDetector + Send + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    pub fn with_drag_policy(mut self, policy: DragPersistPolicy) -> Self {
        self.drag_policy = policy;
        self
    }

    /// Allow drags that start on the image body, not only the handle
    pub fn with_image_drag(mut self, enabled: bool) -> Self {
        self.image_drag = enabled;
        self
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn surface(&self) -> &F {
        &self.surface
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn natural_size(&self) -> Option<ImageSize> {
        self.natural_size
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Whether a decode is outstanding
    pub fn is_decoding(&self) -> bool {
        self.pending.is_some()
    }

    pub fn phase(&self) -> RendererPhase {
        if !self.initialized {
            RendererPhase::Uninitialized
        } else if self.shown {
            RendererPhase::Visible
        } else {
            RendererPhase::Hidden {
                has_image: self.state.has_image,
            }
        }
    }

    // ========================================================================
    // Startup
    // ========================================================================

    /// Restore from the store.
    ///
    /// Returns the decode to run when a stored image exists. Position and
    /// visibility are only applied once that decode completes.
    pub fn load(&mut self) -> Option<DecodeRequest> {
        self.initialized = true;

        let stored = match self.store.read() {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Failed to read overlay state, starting from defaults: {}", e);
                None
            }
        };
        let Some(stored) = stored else {
            debug!("No stored overlay state");
            return None;
        };

        self.state = stored;
        if !self.state.should_restore() {
            return None;
        }
        let raster = self.state.image_data.clone()?;
        info!("Restoring overlay image {}...", raster.preview());
        Some(self.begin_decode(raster, DecodeKind::Restore))
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Apply one command from the control panel
    pub fn handle(&mut self, command: OverlayCommand) -> HandleOutcome {
        debug!("Renderer received {}", command.action());
        let mut outcome = HandleOutcome::default();
        match command {
            OverlayCommand::SetImage(request) => outcome.decode = Some(self.set_image(request)),
            OverlayCommand::UpdateOpacity { opacity } => self.update_opacity(opacity),
            OverlayCommand::UpdateScale { scale } => self.update_scale(scale),
            OverlayCommand::UpdateGrid {
                show_grid,
                pixel_size,
            } => self.update_grid(show_grid, pixel_size),
            OverlayCommand::ShowOverlay => self.show(),
            OverlayCommand::HideOverlay => self.hide(),
            OverlayCommand::RemoveOverlay => self.remove(),
            OverlayCommand::DetectPixelSize => outcome.reply = Some(self.detect_pixel_size()),
        }
        outcome
    }

    /// Stage a new image; it is committed when its decode completes
    pub fn set_image(&mut self, request: SetImageRequest) -> DecodeRequest {
        info!("Setting image with data: {}...", request.image_data.preview());
        let raster = request.image_data.clone();
        let staged = StagedImage {
            pixelize: request.pixel_size > 0,
            visible: true,
            request,
        };
        self.begin_decode(raster, DecodeKind::SetImage(Box::new(staged)))
    }

    fn staged_mut(&mut self) -> Option<&mut StagedImage> {
        match &mut self.pending {
            Some(PendingDecode {
                kind: DecodeKind::SetImage(staged),
                ..
            }) => Some(staged.as_mut()),
            _ => None,
        }
    }

    pub fn update_opacity(&mut self, opacity: f64) {
        self.state.opacity = clamp_opacity(opacity);
        let opacity = self.state.opacity;
        if let Some(staged) = self.staged_mut() {
            staged.request.opacity = opacity;
        }
        self.apply_display();
        self.persist();
    }

    pub fn update_scale(&mut self, scale: f64) {
        if !valid_scale(scale) {
            warn!("Ignoring invalid scale {}", scale);
            return;
        }
        self.state.scale = scale;
        if let Some(staged) = self.staged_mut() {
            staged.request.scale = scale;
        }
        self.apply_display();
        self.apply_grid();
        self.persist();
    }

    pub fn update_grid(&mut self, show: bool, pixel_size: u32) {
        self.state.grid_enabled = show;
        self.state.pixel_size = pixel_size;
        if let Some(staged) = self.staged_mut() {
            staged.request.show_grid = show;
            staged.request.pixel_size = pixel_size;
        }
        self.apply_grid();
        self.persist();
    }

    /// Show the overlay. No-op without an image.
    pub fn show(&mut self) {
        if let Some(staged) = self.staged_mut() {
            staged.visible = true;
        }
        if !self.state.has_image {
            debug!("Show ignored, no image loaded");
            return;
        }
        self.state.visible = true;
        self.present();
        self.persist();
    }

    pub fn hide(&mut self) {
        if let Some(staged) = self.staged_mut() {
            staged.visible = false;
        }
        self.state.visible = false;
        self.surface.set_visible(false);
        self.shown = false;
        self.persist();
    }

    /// Reset to defaults and clear the surface
    pub fn remove(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!("Abandoning decode {:?}", pending.ticket);
        }
        self.drag.end();
        self.surface.set_visible(false);
        self.surface.set_source(None);
        self.surface.set_grid(None);
        self.shown = false;
        self.natural_size = None;
        self.state = OverlayState::default();
        info!("Overlay removed");
        self.persist();
    }

    pub fn detect_pixel_size(&self) -> CommandReply {
        let pixel_size = self.detector.detect();
        info!("Detected pixel size: {:?}", pixel_size);
        CommandReply::PixelSize(PixelSizeReply { pixel_size })
    }

    // ========================================================================
    // Decode completion
    // ========================================================================

    fn begin_decode(&mut self, raster: RasterData, kind: DecodeKind) -> DecodeRequest {
        self.last_ticket += 1;
        let ticket = DecodeTicket(self.last_ticket);
        if let Some(previous) = self.pending.replace(PendingDecode { ticket, kind }) {
            debug!("Decode {:?} superseded by {:?}", previous.ticket, ticket);
        }
        DecodeRequest { ticket, raster }
    }

    /// Report the outcome of a decode started by this renderer
    pub fn finish_decode(&mut self, ticket: DecodeTicket, result: Result<ImageSize, RasterError>) {
        match result {
            Ok(size) => self.complete_decode(ticket, size),
            Err(e) => self.fail_decode(ticket, &e),
        }
    }

    pub fn complete_decode(&mut self, ticket: DecodeTicket, size: ImageSize) {
        let Some(pending) = self.pending.take_if(|p| p.ticket == ticket) else {
            debug!("Discarding stale decode {:?}", ticket);
            return;
        };
        info!("Image loaded, dimensions: {}x{}", size.width, size.height);
        match pending.kind {
            DecodeKind::SetImage(staged) => self.commit_image(*staged, size),
            DecodeKind::Restore => self.commit_restore(size),
        }
    }

    /// The decode failed; the overlay keeps its previous state
    pub fn fail_decode(&mut self, ticket: DecodeTicket, error: &dyn std::fmt::Display) {
        if self.pending.take_if(|p| p.ticket == ticket).is_none() {
            debug!("Ignoring failure of stale decode {:?}: {}", ticket, error);
            return;
        }
        warn!("Image failed to load: {}", error);
    }

    fn commit_image(&mut self, staged: StagedImage, size: ImageSize) {
        let StagedImage {
            request,
            pixelize,
            visible,
        } = staged;
        let SetImageRequest {
            image_data,
            opacity,
            scale,
            pixel_size,
            show_grid,
            original_image_data,
            custom_palette_enabled,
            custom_palette,
        } = request;

        self.surface.set_source(Some(&image_data));
        self.state.original_image_data =
            Some(original_image_data.unwrap_or_else(|| image_data.clone()));
        self.state.image_data = Some(image_data);
        self.state.opacity = clamp_opacity(opacity);
        if valid_scale(scale) {
            self.state.scale = scale;
        } else {
            warn!("Ignoring invalid scale {} in setImage", scale);
        }
        self.state.pixel_size = pixel_size;
        self.state.pixelize_enabled = pixelize;
        self.state.grid_enabled = show_grid;
        self.state.custom_palette_enabled = custom_palette_enabled;
        self.state.custom_palette = custom_palette;
        self.state.has_image = true;
        self.state.visible = visible;
        self.natural_size = Some(size);

        self.apply_display();
        self.apply_grid();
        if visible {
            self.present();
        } else {
            self.surface.set_visible(false);
            self.shown = false;
        }
        self.persist();
    }

    fn commit_restore(&mut self, size: ImageSize) {
        self.natural_size = Some(size);
        if let Some(raster) = &self.state.image_data {
            self.surface.set_source(Some(raster));
        }
        self.apply_display();
        self.apply_grid();
        self.surface.set_position(self.state.position);
        if self.state.visible {
            self.present();
        }
        self.persist();
    }

    // ========================================================================
    // Dragging
    // ========================================================================

    /// Pointer down on the overlay. Returns true if a drag started.
    pub fn pointer_down(&mut self, pointer: Position, target: DragTarget) -> bool {
        if !self.shown {
            return false;
        }
        if target == DragTarget::Image && !self.image_drag {
            return false;
        }
        self.drag.begin(pointer, self.state.position);
        true
    }

    pub fn pointer_move(&mut self, pointer: Position) {
        let Some(position) = self.drag.update(pointer) else {
            return;
        };
        self.state.position = position;
        self.surface.set_position(position);
        if self.drag_policy == DragPersistPolicy::EveryMove {
            self.persist();
        }
    }

    /// Pointer up anywhere on the page
    pub fn pointer_up(&mut self) {
        if self.drag.end() && self.drag_policy == DragPersistPolicy::DragEnd {
            self.persist();
        }
    }

    // ========================================================================
    // Presentation
    // ========================================================================

    fn apply_display(&mut self) {
        if self.natural_size.is_none() {
            return;
        }
        self.surface.apply_transform(self.state.opacity, self.state.scale);
    }

    fn apply_grid(&mut self) {
        let grid = match self.natural_size {
            Some(size) if self.state.grid_enabled && self.state.pixel_size > 0 => {
                Some(GridLayout::compute(size, self.state.pixel_size, self.state.scale))
            }
            _ => None,
        };
        self.surface.set_grid(grid.as_ref());
    }

    /// Put the overlay on screen, once there is a decoded image to show
    fn present(&mut self) {
        if self.natural_size.is_none() {
            return;
        }
        debug!("Showing overlay at {:?}", self.state.position);
        self.surface.set_position(self.state.position);
        self.surface.set_visible(true);
        self.shown = true;
    }

    fn persist(&self) {
        if let Err(e) = self.store.write(&self.state) {
            warn!("Failed to persist overlay state: {}", e);
        }
    }
}
