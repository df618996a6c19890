//! Self-describing encoded raster carried across the command boundary.

use serde::{Deserialize, Serialize};

/// An encoded image as a data URL (`data:<media type>;base64,<payload>`).
///
/// Rasters never cross the command boundary as raw pixel buffers; decoding
/// and encoding live in the imaging crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RasterData(String);

/// The pieces of a data URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUrlParts<'a> {
    pub media_type: &'a str,
    pub base64: bool,
    pub payload: &'a str,
}

impl RasterData {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Build a base64 data URL from an already-encoded payload
    pub fn from_base64(media_type: &str, payload: &str) -> Self {
        Self(format!("data:{};base64,{}", media_type, payload))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the URL into media type, encoding flag and payload.
    /// Returns None if this is not a data URL.
    pub fn parts(&self) -> Option<DataUrlParts<'_>> {
        let rest = self.0.strip_prefix("data:")?;
        let (header, payload) = rest.split_once(',')?;
        let base64 = header.ends_with(";base64");
        let media_type = header.split(';').next().unwrap_or_default();
        Some(DataUrlParts {
            media_type,
            base64,
            payload,
        })
    }

    pub fn media_type(&self) -> Option<&str> {
        self.parts().map(|parts| parts.media_type)
    }

    /// Leading characters of the URL, for log lines
    pub fn preview(&self) -> &str {
        match self.0.char_indices().nth(50) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl std::fmt::Display for RasterData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
