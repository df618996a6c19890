//! Data URL codec for RGBA rasters

use std::io::Cursor;

use base64::{Engine, engine::general_purpose};
use image::{ImageFormat, RgbaImage};
use pixel_overlay_ipc::RasterData;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Not a data URL")]
    NotDataUrl,
    #[error("Unsupported data URL encoding for {0} (expected base64)")]
    NotBase64(String),
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Image decode failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Pixel dimensions of a decoded raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Decode a data URL into an RGBA raster
pub fn decode_raster(raster: &RasterData) -> Result<RgbaImage, RasterError> {
    let parts = raster.parts().ok_or(RasterError::NotDataUrl)?;
    if !parts.base64 {
        return Err(RasterError::NotBase64(parts.media_type.to_string()));
    }
    let bytes = general_purpose::STANDARD.decode(parts.payload.trim())?;
    let image = image::load_from_memory(&bytes)?;
    Ok(image.to_rgba8())
}

/// Decode a data URL and report only its natural dimensions
pub fn decode_size(raster: &RasterData) -> Result<ImageSize, RasterError> {
    let image = decode_raster(raster)?;
    Ok(ImageSize {
        width: image.width(),
        height: image.height(),
    })
}

/// Encode an RGBA raster as a PNG data URL
pub fn encode_png(image: &RgbaImage) -> Result<RasterData, RasterError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(RasterData::from_base64(
        ImageFormat::Png.to_mime_type(),
        &general_purpose::STANDARD.encode(&bytes),
    ))
}

/// Wrap raw file bytes as a data URL, sniffing the format from the content
pub fn raster_from_bytes(bytes: &[u8]) -> Result<RasterData, RasterError> {
    let format = image::guess_format(bytes)?;
    Ok(RasterData::from_base64(
        format.to_mime_type(),
        &general_purpose::STANDARD.encode(bytes),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_png_data_url_preserves_pixels() {
        let mut image = RgbaImage::new(3, 2);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(2, 1, Rgba([0, 0, 255, 128]));

        let raster = encode_png(&image).unwrap();
        assert_eq!(raster.media_type(), Some("image/png"));

        let decoded = decode_raster(&raster).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_decode_size() {
        let raster = encode_png(&RgbaImage::new(7, 5)).unwrap();
        assert_eq!(
            decode_size(&raster).unwrap(),
            ImageSize {
                width: 7,
                height: 5
            }
        );
    }

    #[test]
    fn test_raster_from_bytes_sniffs_format() {
        let png = encode_png(&RgbaImage::new(2, 2)).unwrap();
        let bytes = general_purpose::STANDARD
            .decode(png.parts().unwrap().payload)
            .unwrap();
        let raster = raster_from_bytes(&bytes).unwrap();
        assert_eq!(raster.media_type(), Some("image/png"));
        assert_eq!(decode_raster(&raster).unwrap().dimensions(), (2, 2));
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            decode_raster(&RasterData::new("hello")),
            Err(RasterError::NotDataUrl)
        ));
        assert!(matches!(
            decode_raster(&RasterData::new("data:image/png,abc")),
            Err(RasterError::NotBase64(_))
        ));
        assert!(matches!(
            decode_raster(&RasterData::new("data:image/png;base64,!!!")),
            Err(RasterError::Base64(_))
        ));
        assert!(matches!(
            decode_raster(&RasterData::new("data:image/png;base64,AAAA")),
            Err(RasterError::Image(_))
        ));
    }
}
