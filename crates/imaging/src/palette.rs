//! Palette text parsing and nearest-color quantization

use std::sync::LazyLock;

use image::RgbaImage;
use regex::Regex;

/// Accepted palette entry: six hex digits, optional leading '#'
static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#?([0-9A-Fa-f]{2})([0-9A-Fa-f]{2})([0-9A-Fa-f]{2})$")
        .expect("palette pattern is valid")
});

/// An ordered list of RGB palette colors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<[u8; 3]>,
}

impl Palette {
    pub fn new(colors: Vec<[u8; 3]>) -> Self {
        Self { colors }
    }

    /// Parse comma-separated palette text.
    ///
    /// Entries are trimmed; anything that is not a 6-digit hex color is
    /// dropped without error, so the result may be empty.
    pub fn parse(text: &str) -> Self {
        let colors = text
            .split(',')
            .map(str::trim)
            .filter_map(parse_hex_color)
            .collect::<Vec<_>>();

        let entries = text.split(',').filter(|e| !e.trim().is_empty()).count();
        if colors.len() < entries {
            tracing::debug!(
                "Dropped {} malformed palette entries",
                entries - colors.len()
            );
        }

        Self { colors }
    }

    pub fn colors(&self) -> &[[u8; 3]] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn contains(&self, rgb: [u8; 3]) -> bool {
        self.colors.contains(&rgb)
    }

    /// Nearest palette color by Euclidean RGB distance; the first entry wins ties.
    /// Returns None for an empty palette.
    pub fn nearest(&self, rgb: [u8; 3]) -> Option<[u8; 3]> {
        let mut best: Option<([u8; 3], u32)> = None;
        for &candidate in &self.colors {
            let distance = distance_squared(rgb, candidate);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((candidate, distance)),
            }
        }
        best.map(|(color, _)| color)
    }
}

/// Parse one `#rrggbb` / `rrggbb` entry
pub fn parse_hex_color(entry: &str) -> Option<[u8; 3]> {
    let captures = HEX_COLOR.captures(entry)?;
    let channel = |i: usize| u8::from_str_radix(&captures[i], 16).ok();
    Some([channel(1)?, channel(2)?, channel(3)?])
}

// Squared distance orders identically to Euclidean distance.
fn distance_squared(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as i32 - y as i32;
            (d * d) as u32
        })
        .sum()
}

/// Replace every pixel's RGB with its nearest palette color.
/// Alpha is untouched; an empty palette leaves the raster unchanged.
pub fn quantize(image: &mut RgbaImage, palette: &Palette) {
    if palette.is_empty() {
        return;
    }
    for pixel in image.pixels_mut() {
        let rgb = [pixel[0], pixel[1], pixel[2]];
        if let Some(nearest) = palette.nearest(rgb) {
            pixel[0] = nearest[0];
            pixel[1] = nearest[1];
            pixel[2] = nearest[2];
        }
    }
}
