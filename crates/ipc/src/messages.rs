//! Commands from the control panel to the overlay renderer.

use serde::{Deserialize, Serialize};

use crate::error::IpcError;
use crate::types::RasterData;

/// Full image and display update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetImageRequest {
    /// Raster to display (pixelized when pixelization is on)
    pub image_data: RasterData,
    pub opacity: f64,
    pub scale: f64,
    /// 0 when pixelization is off
    #[serde(default)]
    pub pixel_size: u32,
    #[serde(default)]
    pub show_grid: bool,
    /// Unmodified source; the displayed raster is used when absent
    #[serde(default)]
    pub original_image_data: Option<RasterData>,
    #[serde(default)]
    pub custom_palette_enabled: bool,
    #[serde(default)]
    pub custom_palette: String,
}

/// One message per panel action. Fire-and-forget except `DetectPixelSize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OverlayCommand {
    SetImage(SetImageRequest),
    /// Opacity (0.0-1.0)
    UpdateOpacity { opacity: f64 },
    /// Display scale (> 0)
    UpdateScale { scale: f64 },
    UpdateGrid { show_grid: bool, pixel_size: u32 },
    ShowOverlay,
    HideOverlay,
    RemoveOverlay,
    /// Ask the renderer's detector for the host page's block size
    DetectPixelSize,
}

impl OverlayCommand {
    /// Every action the renderer understands
    pub const ACTIONS: [&'static str; 8] = [
        "setImage",
        "updateOpacity",
        "updateScale",
        "updateGrid",
        "showOverlay",
        "hideOverlay",
        "removeOverlay",
        "detectPixelSize",
    ];

    /// Wire name of the action
    pub fn action(&self) -> &'static str {
        match self {
            Self::SetImage(_) => "setImage",
            Self::UpdateOpacity { .. } => "updateOpacity",
            Self::UpdateScale { .. } => "updateScale",
            Self::UpdateGrid { .. } => "updateGrid",
            Self::ShowOverlay => "showOverlay",
            Self::HideOverlay => "hideOverlay",
            Self::RemoveOverlay => "removeOverlay",
            Self::DetectPixelSize => "detectPixelSize",
        }
    }

    /// Whether the sender waits for a one-shot reply
    pub fn expects_reply(&self) -> bool {
        matches!(self, Self::DetectPixelSize)
    }

    pub fn to_json(&self) -> Result<String, IpcError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, IpcError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| IpcError::Syntax(e.to_string()))?;
        let action = value
            .get("action")
            .and_then(serde_json::Value::as_str)
            .ok_or(IpcError::MissingAction)?
            .to_string();
        if !Self::ACTIONS.contains(&action.as_str()) {
            return Err(IpcError::UnknownAction(action));
        }
        serde_json::from_value(value).map_err(|e| IpcError::Malformed {
            action,
            reason: e.to_string(),
        })
    }
}

/// Reply to `detectPixelSize`: `{pixelSize: integer|null}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelSizeReply {
    pub pixel_size: Option<u32>,
}

/// Replies sent back over the one-shot channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandReply {
    PixelSize(PixelSizeReply),
}

impl CommandReply {
    pub fn pixel_size(&self) -> Option<u32> {
        match self {
            Self::PixelSize(reply) => reply.pixel_size,
        }
    }
}
