//! Share codes: base64 of a JSON overlay configuration
//!
//! Opacity and scale travel as the panel's percent values. Position and
//! visibility are never shared.

use base64::{Engine, engine::general_purpose};
use pixel_overlay_config::{ControlRange, OPACITY_PERCENT, PIXEL_SIZE, SCALE_PERCENT};
use pixel_overlay_imaging::RasterError;
use pixel_overlay_ipc::RasterData;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShareCodeError {
    #[error("Share code is empty")]
    Empty,

    #[error("Invalid share code format: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid share code format: not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid share code format: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid share code: missing image data")]
    MissingImageData,

    #[error("Invalid share code: image data is not a base64 data URL")]
    InvalidImageData,

    #[error("Invalid share code: {0}")]
    Image(#[from] RasterError),
}

/// Portable overlay configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareConfig {
    /// Percent (0-100)
    pub opacity: u32,
    /// Percent (10-1000)
    pub scale: u32,
    pub pixel_size: u32,
    pub pixelize_enabled: bool,
    pub grid_enabled: bool,
    pub custom_palette_enabled: bool,
    pub custom_palette: String,
    /// The unmodified source image
    pub image_data: RasterData,
}

/// Wire form accepted on decode; every field is optional
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShareRecord {
    opacity: Option<f64>,
    scale: Option<f64>,
    pixel_size: Option<f64>,
    pixelize_enabled: Option<bool>,
    grid_enabled: Option<bool>,
    custom_palette_enabled: Option<bool>,
    custom_palette: Option<String>,
    image_data: Option<String>,
}

fn ranged_or_default(value: Option<f64>, range: ControlRange) -> u32 {
    value.map_or(range.default, |v| range.clamp_f64(v))
}

fn is_base64_data_url(raster: &RasterData) -> bool {
    raster.parts().is_some_and(|parts| {
        parts.base64
            && !parts.payload.is_empty()
            && general_purpose::STANDARD.decode(parts.payload).is_ok()
    })
}

impl ShareConfig {
    pub fn encode(&self) -> Result<String, ShareCodeError> {
        let json = serde_json::to_string(self)?;
        Ok(general_purpose::STANDARD.encode(json))
    }

    /// Parse a share code; absent fields take the panel defaults
    pub fn decode(code: &str) -> Result<Self, ShareCodeError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ShareCodeError::Empty);
        }
        let bytes = general_purpose::STANDARD.decode(code)?;
        let json = String::from_utf8(bytes)?;
        let record: ShareRecord = serde_json::from_str(&json)?;

        let image_data = record
            .image_data
            .filter(|data| !data.is_empty())
            .map(RasterData::new)
            .ok_or(ShareCodeError::MissingImageData)?;
        if !is_base64_data_url(&image_data) {
            return Err(ShareCodeError::InvalidImageData);
        }

        Ok(Self {
            opacity: ranged_or_default(record.opacity, OPACITY_PERCENT),
            scale: ranged_or_default(record.scale, SCALE_PERCENT),
            pixel_size: ranged_or_default(record.pixel_size, PIXEL_SIZE),
            pixelize_enabled: record.pixelize_enabled.unwrap_or(false),
            grid_enabled: record.grid_enabled.unwrap_or(false),
            custom_palette_enabled: record.custom_palette_enabled.unwrap_or(false),
            custom_palette: record.custom_palette.unwrap_or_default(),
            image_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ShareConfig {
        ShareConfig {
            opacity: 70,
            scale: 250,
            pixel_size: 8,
            pixelize_enabled: true,
            grid_enabled: true,
            custom_palette_enabled: true,
            custom_palette: "#000000, #ffffff".to_string(),
            image_data: RasterData::from_base64("image/png", "iVBORw0KGgo="),
        }
    }

    fn code_for(json: &str) -> String {
        general_purpose::STANDARD.encode(json)
    }

    #[test]
    fn test_round_trip() {
        let config = config();
        let code = config.encode().unwrap();
        assert_eq!(ShareConfig::decode(&code).unwrap(), config);
    }

    #[test]
    fn test_wire_field_names() {
        let code = config().encode().unwrap();
        let json = String::from_utf8(general_purpose::STANDARD.decode(code).unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["opacity"], 70);
        assert_eq!(value["pixelSize"], 8);
        assert_eq!(value["customPaletteEnabled"], true);
        assert!(value["imageData"].as_str().unwrap().starts_with("data:image/png;base64,"));
        assert!(value.get("position").is_none());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let code = code_for(r#"{"imageData":"data:image/png;base64,AAAA"}"#);
        let config = ShareConfig::decode(&code).unwrap();
        assert_eq!(config.opacity, 50);
        assert_eq!(config.scale, 100);
        assert_eq!(config.pixel_size, 16);
        assert!(!config.pixelize_enabled);
        assert!(config.custom_palette.is_empty());
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let json = serde_json::json!({
            "imageData": "data:image/png;base64,AAAA",
            "opacity": 140.4,
            "scale": 2,
            "pixelSize": 500,
        });
        let code = code_for(&json.to_string());
        let config = ShareConfig::decode(&code).unwrap();
        assert_eq!(config.opacity, 100);
        assert_eq!(config.scale, 10);
        assert_eq!(config.pixel_size, 128);
    }

    #[test]
    fn test_invalid_codes() {
        assert!(matches!(ShareConfig::decode("   "), Err(ShareCodeError::Empty)));
        assert!(matches!(
            ShareConfig::decode("%%%not base64%%%"),
            Err(ShareCodeError::Base64(_))
        ));
        assert!(matches!(
            ShareConfig::decode(&code_for("not json")),
            Err(ShareCodeError::Json(_))
        ));
        assert!(matches!(
            ShareConfig::decode(&general_purpose::STANDARD.encode([0xff, 0xfe])),
            Err(ShareCodeError::Utf8(_))
        ));
        assert!(matches!(
            ShareConfig::decode(&code_for(r#"{"opacity":50}"#)),
            Err(ShareCodeError::MissingImageData)
        ));
        assert!(matches!(
            ShareConfig::decode(&code_for(r#"{"imageData":""}"#)),
            Err(ShareCodeError::MissingImageData)
        ));
        for image_data in [
            "garbage",
            "data:image/png,%89PNG",
            "data:image/png;base64,",
            "data:image/png;base64,@@not-base64@@",
        ] {
            let json = serde_json::json!({ "imageData": image_data }).to_string();
            assert!(
                matches!(
                    ShareConfig::decode(&code_for(&json)),
                    Err(ShareCodeError::InvalidImageData)
                ),
                "{}",
                image_data
            );
        }
    }
}
