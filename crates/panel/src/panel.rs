//! Control panel state and its command triggers

use pixel_overlay_config::{OPACITY_PERCENT, PIXEL_SIZE, PalettePreset, SCALE_PERCENT};
use pixel_overlay_imaging::{Palette, RasterError, decode_size, pixelize_raster, raster_from_bytes};
use pixel_overlay_ipc::{CommandReply, OverlayCommand, RasterData, SetImageRequest};
use pixel_overlay_store::StateStore;
use tracing::{debug, info, warn};

use crate::share::{ShareCodeError, ShareConfig};
use crate::transport::{CommandDispatcher, CommandTransport};

/// Inputs applied together with a newly loaded image
#[derive(Debug, Clone, Default)]
pub struct ImageSettings {
    pub opacity_percent: Option<u32>,
    pub scale_percent: Option<u32>,
    pub pixel_size: Option<u32>,
    pub pixelize_enabled: bool,
    pub grid_enabled: bool,
    /// Custom palette text; setting it also enables the custom palette
    pub palette_text: Option<String>,
}

/// The transient control panel.
///
/// Mirrors the popup's inputs. Every user action maps to at most one
/// command; the panel holds no overlay position and only a visibility
/// toggle for labelling.
pub struct ControlPanel<T, S> {
    dispatcher: CommandDispatcher<T>,
    store: S,
    opacity_percent: u32,
    scale_percent: u32,
    pixel_size: u32,
    pixelize_enabled: bool,
    grid_enabled: bool,
    custom_palette_enabled: bool,
    palette_text: String,
    /// Unmodified user image; present exactly when an image is loaded
    original: Option<RasterData>,
    overlay_visible: bool,
}

impl<T: CommandTransport, S: StateStore> ControlPanel<T, S> {
    pub fn new(dispatcher: CommandDispatcher<T>, store: S) -> Self {
        Self {
            dispatcher,
            store,
            opacity_percent: OPACITY_PERCENT.default,
            scale_percent: SCALE_PERCENT.default,
            pixel_size: PIXEL_SIZE.default,
            pixelize_enabled: false,
            grid_enabled: false,
            custom_palette_enabled: false,
            palette_text: String::new(),
            original: None,
            overlay_visible: false,
        }
    }

    pub fn has_image(&self) -> bool {
        self.original.is_some()
    }

    pub fn original(&self) -> Option<&RasterData> {
        self.original.as_ref()
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn opacity_percent(&self) -> u32 {
        self.opacity_percent
    }

    pub fn scale_percent(&self) -> u32 {
        self.scale_percent
    }

    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    pub fn pixelize_enabled(&self) -> bool {
        self.pixelize_enabled
    }

    pub fn grid_enabled(&self) -> bool {
        self.grid_enabled
    }

    pub fn custom_palette_enabled(&self) -> bool {
        self.custom_palette_enabled
    }

    pub fn palette_text(&self) -> &str {
        &self.palette_text
    }

    /// Load the inputs from the stored snapshot. Sends nothing.
    ///
    /// Returns true if an overlay image was found.
    pub fn restore(&mut self) -> bool {
        let state = match self.store.read() {
            Ok(Some(state)) => state,
            Ok(None) => return false,
            Err(e) => {
                warn!("Failed to read overlay state: {}", e);
                return false;
            }
        };
        if !state.has_image {
            return false;
        }
        let Some(original) = state.source_raster().cloned() else {
            return false;
        };

        self.original = Some(original);
        self.overlay_visible = state.visible;
        self.opacity_percent = OPACITY_PERCENT.clamp_f64(state.opacity * 100.0);
        self.scale_percent = SCALE_PERCENT.clamp_f64(state.scale * 100.0);
        if state.pixel_size > 0 {
            self.pixel_size = PIXEL_SIZE.clamp(state.pixel_size);
        }
        self.pixelize_enabled = state.pixelize_enabled;
        self.grid_enabled = state.grid_enabled;
        self.custom_palette_enabled = state.custom_palette_enabled;
        self.palette_text = state.custom_palette;
        debug!("Panel restored from stored overlay");
        true
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    /// Load a user image from encoded file bytes and display it
    pub async fn load_image(&mut self, bytes: &[u8]) -> Result<(), RasterError> {
        let raster = raster_from_bytes(bytes)?;
        info!("Loaded image ({} bytes)", bytes.len());
        self.display(raster).await;
        Ok(())
    }

    /// Load a user image and adopt `settings` first, so that a single
    /// `setImage` carries all of them
    pub async fn load_image_with(
        &mut self,
        bytes: &[u8],
        settings: ImageSettings,
    ) -> Result<(), RasterError> {
        let raster = raster_from_bytes(bytes)?;
        if let Some(percent) = settings.opacity_percent {
            self.opacity_percent = OPACITY_PERCENT.clamp(percent);
        }
        if let Some(percent) = settings.scale_percent {
            self.scale_percent = SCALE_PERCENT.clamp(percent);
        }
        if let Some(pixel_size) = settings.pixel_size {
            self.pixel_size = PIXEL_SIZE.clamp(pixel_size);
        }
        self.pixelize_enabled = settings.pixelize_enabled;
        self.grid_enabled = settings.grid_enabled;
        if let Some(text) = settings.palette_text {
            self.palette_text = text;
            self.custom_palette_enabled = true;
        }
        info!("Loaded image ({} bytes) with settings", bytes.len());
        self.display(raster).await;
        Ok(())
    }

    async fn display(&mut self, raster: RasterData) {
        self.original = Some(raster);
        self.overlay_visible = true;
        self.apply_pixelization().await;
    }

    pub async fn set_opacity_percent(&mut self, percent: u32) {
        self.opacity_percent = OPACITY_PERCENT.clamp(percent);
        if self.has_image() {
            let opacity = f64::from(self.opacity_percent) / 100.0;
            self.send(OverlayCommand::UpdateOpacity { opacity }).await;
        }
    }

    pub async fn set_scale_percent(&mut self, percent: u32) {
        self.scale_percent = SCALE_PERCENT.clamp(percent);
        if self.has_image() {
            let scale = f64::from(self.scale_percent) / 100.0;
            self.send(OverlayCommand::UpdateScale { scale }).await;
        }
    }

    pub async fn set_pixel_size(&mut self, pixel_size: u32) {
        self.pixel_size = PIXEL_SIZE.clamp(pixel_size);
        if self.has_image() && self.pixelize_enabled {
            self.apply_pixelization().await;
        }
    }

    pub async fn set_pixelize_enabled(&mut self, enabled: bool) {
        self.pixelize_enabled = enabled;
        if self.has_image() {
            self.apply_pixelization().await;
        }
        self.update_grid_visibility().await;
    }

    pub async fn set_grid_enabled(&mut self, enabled: bool) {
        self.grid_enabled = enabled;
        self.update_grid_visibility().await;
    }

    pub async fn set_custom_palette_enabled(&mut self, enabled: bool) {
        self.custom_palette_enabled = enabled;
        if self.has_image() && self.pixelize_enabled {
            self.apply_pixelization().await;
        }
    }

    pub async fn set_palette_text(&mut self, text: impl Into<String>) {
        self.palette_text = text.into();
        self.palette_changed().await;
    }

    pub async fn load_preset(&mut self, preset: PalettePreset) {
        self.palette_text = preset.text();
        self.palette_changed().await;
    }

    pub async fn clear_palette(&mut self) {
        self.palette_text.clear();
        self.palette_changed().await;
    }

    async fn palette_changed(&mut self) {
        if self.has_image() && self.pixelize_enabled && self.custom_palette_enabled {
            self.apply_pixelization().await;
        }
    }

    // ========================================================================
    // Overlay actions
    // ========================================================================

    pub async fn toggle_visibility(&mut self) {
        if !self.has_image() {
            return;
        }
        self.overlay_visible = !self.overlay_visible;
        let command = if self.overlay_visible {
            OverlayCommand::ShowOverlay
        } else {
            OverlayCommand::HideOverlay
        };
        self.send(command).await;
    }

    pub async fn remove_overlay(&mut self) {
        self.original = None;
        self.overlay_visible = false;
        self.send(OverlayCommand::RemoveOverlay).await;
    }

    /// Share code for the current configuration, if an image is loaded
    pub fn share_code(&self) -> Result<Option<String>, ShareCodeError> {
        let Some(original) = &self.original else {
            return Ok(None);
        };
        let config = ShareConfig {
            opacity: self.opacity_percent,
            scale: self.scale_percent,
            pixel_size: self.pixel_size,
            pixelize_enabled: self.pixelize_enabled,
            grid_enabled: self.grid_enabled,
            custom_palette_enabled: self.custom_palette_enabled,
            custom_palette: self.palette_text.clone(),
            image_data: original.clone(),
        };
        config.encode().map(Some)
    }

    /// Apply a share code. On error nothing changes.
    pub async fn load_share_code(&mut self, code: &str) -> Result<(), ShareCodeError> {
        let config = ShareConfig::decode(code)?;
        let image = config.image_data.clone();
        match tokio::task::spawn_blocking(move || decode_size(&image)).await {
            Ok(result) => {
                result?;
            }
            Err(e) => {
                warn!("Share code image check failed: {}", e);
                return Err(ShareCodeError::InvalidImageData);
            }
        }
        self.opacity_percent = config.opacity;
        self.scale_percent = config.scale;
        self.pixel_size = config.pixel_size;
        self.pixelize_enabled = config.pixelize_enabled;
        self.grid_enabled = config.grid_enabled;
        self.custom_palette_enabled = config.custom_palette_enabled;
        self.palette_text = config.custom_palette;
        self.original = Some(config.image_data);
        self.overlay_visible = true;
        info!("Loaded shared configuration");
        self.apply_pixelization().await;
        Ok(())
    }

    /// Ask the renderer for the host page's block size and adopt it
    pub async fn auto_match_pixel_size(&mut self) -> Option<u32> {
        let reply = self.send(OverlayCommand::DetectPixelSize).await;
        let Some(detected) = reply.and_then(|r| r.pixel_size()).filter(|&size| size > 0) else {
            info!("Pixel size not detected");
            return None;
        };
        self.pixel_size = PIXEL_SIZE.clamp(detected);
        info!("Matched pixel size {}", self.pixel_size);
        if self.has_image() && self.pixelize_enabled {
            self.apply_pixelization().await;
        }
        Some(self.pixel_size)
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Send `setImage` built from the original image and current inputs
    pub async fn apply_pixelization(&self) {
        let Some(original) = self.original.clone() else {
            return;
        };

        let request = if self.pixelize_enabled {
            let pixel_size = self.pixel_size;
            let palette = self
                .custom_palette_enabled
                .then(|| Palette::parse(&self.palette_text));
            let source = original.clone();
            let pixelized = tokio::task::spawn_blocking(move || {
                pixelize_raster(&source, pixel_size, palette.as_ref())
            })
            .await;
            let image_data = match pixelized {
                Ok(Ok(raster)) => raster,
                Ok(Err(e)) => {
                    warn!("Pixelization failed: {}", e);
                    return;
                }
                Err(e) => {
                    warn!("Pixelization task failed: {}", e);
                    return;
                }
            };
            self.set_image_request(image_data, pixel_size, self.grid_enabled, original)
        } else {
            self.set_image_request(original.clone(), 0, false, original)
        };

        self.send(OverlayCommand::SetImage(request)).await;
    }

    fn set_image_request(
        &self,
        image_data: RasterData,
        pixel_size: u32,
        show_grid: bool,
        original: RasterData,
    ) -> SetImageRequest {
        SetImageRequest {
            image_data,
            opacity: f64::from(self.opacity_percent) / 100.0,
            scale: f64::from(self.scale_percent) / 100.0,
            pixel_size,
            show_grid,
            original_image_data: Some(original),
            custom_palette_enabled: self.custom_palette_enabled,
            custom_palette: self.palette_text.clone(),
        }
    }

    async fn update_grid_visibility(&self) {
        if !self.has_image() {
            return;
        }
        self.send(OverlayCommand::UpdateGrid {
            show_grid: self.grid_enabled && self.pixelize_enabled,
            pixel_size: self.pixel_size,
        })
        .await;
    }

    async fn send(&self, command: OverlayCommand) -> Option<CommandReply> {
        self.dispatcher.dispatch(&command).await
    }
}
