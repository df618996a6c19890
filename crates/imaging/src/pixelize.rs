//! Pixelizer - point-sampled downsample followed by nearest-neighbour upscale
//!
//! Each destination pixel samples exactly one source pixel (no averaging),
//! which keeps the hard-edged "chunky pixel" look. Both passes sample at the
//! pixel center, so the result is a pure function of the source and block size.

use image::RgbaImage;
use pixel_overlay_ipc::RasterData;

use crate::palette::{Palette, quantize};
use crate::raster::{RasterError, decode_raster, encode_png};

/// Source coordinate sampled by destination index `dst` when mapping
/// `src_len` pixels onto `dst_len` pixels.
#[inline]
fn sample_index(dst: u32, src_len: u32, dst_len: u32) -> u32 {
    let index = ((2 * dst as u64 + 1) * src_len as u64) / (2 * dst_len as u64);
    (index as u32).min(src_len - 1)
}

/// Dimensions of the reduced grid for a block size; each axis is at least 1
pub fn reduced_dimensions(width: u32, height: u32, pixel_size: u32) -> (u32, u32) {
    let pixel_size = pixel_size.max(1);
    ((width / pixel_size).max(1), (height / pixel_size).max(1))
}

/// Resample `source` to `width`x`height` taking one source pixel per output pixel
pub fn resample_nearest(source: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (src_w, src_h) = source.dimensions();
    if src_w == 0 || src_h == 0 || width == 0 || height == 0 {
        return RgbaImage::new(width, height);
    }
    RgbaImage::from_fn(width, height, |x, y| {
        *source.get_pixel(
            sample_index(x, src_w, width),
            sample_index(y, src_h, height),
        )
    })
}

/// Pixelize `source` with blocks of `pixel_size` source pixels.
///
/// The source is reduced to floor(W/P) x floor(H/P), optionally quantized to
/// `palette` on the reduced grid, then scaled back to W x H so each block is
/// one flat color. A block size of 0 is treated as 1.
pub fn pixelize(source: &RgbaImage, pixel_size: u32, palette: Option<&Palette>) -> RgbaImage {
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return source.clone();
    }

    let (reduced_w, reduced_h) = reduced_dimensions(width, height, pixel_size);
    let mut reduced = resample_nearest(source, reduced_w, reduced_h);

    if let Some(palette) = palette {
        quantize(&mut reduced, palette);
    }

    resample_nearest(&reduced, width, height)
}

/// Decode, pixelize and re-encode a raster as PNG
pub fn pixelize_raster(
    raster: &RasterData,
    pixel_size: u32,
    palette: Option<&Palette>,
) -> Result<RasterData, RasterError> {
    let source = decode_raster(raster)?;
    let (reduced_w, reduced_h) = reduced_dimensions(source.width(), source.height(), pixel_size);
    tracing::debug!(
        "Pixelizing {}x{} -> {}x{} (block {}, palette {})",
        source.width(),
        source.height(),
        reduced_w,
        reduced_h,
        pixel_size.max(1),
        palette.map_or(0, Palette::len)
    );
    encode_png(&pixelize(&source, pixel_size, palette))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::collections::HashSet;

    fn noise(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let v = x.wrapping_mul(2654435761).wrapping_add(y.wrapping_mul(40503));
            Rgba([v as u8, (v >> 8) as u8, (v >> 16) as u8, 255])
        })
    }

    /// Color of every block must be uniform; returns the number of distinct blocks
    fn assert_flat_blocks(image: &RgbaImage, block: u32) -> usize {
        let mut blocks = 0;
        for by in (0..image.height()).step_by(block as usize) {
            for bx in (0..image.width()).step_by(block as usize) {
                let first = image.get_pixel(bx, by);
                for y in by..(by + block).min(image.height()) {
                    for x in bx..(bx + block).min(image.width()) {
                        assert_eq!(image.get_pixel(x, y), first, "block ({bx},{by}) not flat");
                    }
                }
                blocks += 1;
            }
        }
        blocks
    }

    #[test]
    fn test_reduced_dimensions() {
        assert_eq!(reduced_dimensions(64, 64, 8), (8, 8));
        assert_eq!(reduced_dimensions(65, 30, 8), (8, 3));
        assert_eq!(reduced_dimensions(10, 10, 50), (1, 1));
        assert_eq!(reduced_dimensions(10, 10, 0), (10, 10));
    }

    #[test]
    fn test_64x64_block_8_gives_8x8_flat_blocks() {
        let source = noise(64, 64);
        let result = pixelize(&source, 8, None);
        assert_eq!(result.dimensions(), (64, 64));
        assert_eq!(assert_flat_blocks(&result, 8), 64);
    }

    #[test]
    fn test_output_keeps_source_size() {
        for (w, h, p) in [(37, 23, 5), (9, 40, 3), (5, 5, 1), (12, 7, 12)] {
            let result = pixelize(&noise(w, h), p, None);
            assert_eq!(result.dimensions(), (w, h));
        }
    }

    #[test]
    fn test_distinct_runs_bounded_by_block_count() {
        let (w, h, p) = (37u32, 23u32, 5u32);
        let result = pixelize(&noise(w, h), p, None);

        // Column boundaries are shared by every row, so count distinct
        // column/row spans where the color changes.
        let mut column_spans = HashSet::new();
        for y in 0..h {
            let mut span = 0;
            for x in 1..w {
                if result.get_pixel(x, y) != result.get_pixel(x - 1, y) {
                    span += 1;
                }
            }
            column_spans.insert(span);
        }
        let max_columns = column_spans.into_iter().max().unwrap_or(0) + 1;
        assert!(max_columns as u32 <= w.div_ceil(p));
    }

    #[test]
    fn test_block_larger_than_image_is_single_color() {
        let result = pixelize(&noise(10, 6), 20, None);
        let first = *result.get_pixel(0, 0);
        assert!(result.pixels().all(|p| *p == first));
    }

    #[test]
    fn test_block_larger_than_one_axis_gives_stripes() {
        let result = pixelize(&noise(40, 6), 10, None);
        // Height collapses to one block: every column is uniform
        for x in 0..40 {
            let top = *result.get_pixel(x, 0);
            for y in 0..6 {
                assert_eq!(*result.get_pixel(x, y), top);
            }
        }
    }

    #[test]
    fn test_block_size_one_is_identity() {
        let source = noise(13, 9);
        assert_eq!(pixelize(&source, 1, None), source);
        assert_eq!(pixelize(&source, 0, None), source);
    }

    #[test]
    fn test_repixelize_same_block_is_unchanged() {
        for (w, h, p) in [(64, 64, 8), (50, 35, 6), (33, 17, 4)] {
            let once = pixelize(&noise(w, h), p, None);
            let twice = pixelize(&once, p, None);
            assert_eq!(once, twice, "{w}x{h} block {p}");
        }
    }

    #[test]
    fn test_palette_applies_per_block() {
        let palette = Palette::parse("#000000, #ffffff");
        let result = pixelize(&noise(32, 32), 4, Some(&palette));
        for pixel in result.pixels() {
            assert!(palette.contains([pixel[0], pixel[1], pixel[2]]));
        }
        assert_flat_blocks(&result, 4);
    }

    #[test]
    fn test_empty_palette_matches_no_palette() {
        let source = noise(24, 24);
        assert_eq!(
            pixelize(&source, 3, Some(&Palette::default())),
            pixelize(&source, 3, None)
        );
    }

    #[test]
    fn test_zero_area_passes_through() {
        let source = RgbaImage::new(0, 5);
        assert_eq!(pixelize(&source, 4, None).dimensions(), (0, 5));
    }

    #[test]
    fn test_pixelize_raster_round_trip() {
        let raster = encode_png(&noise(16, 16)).unwrap();
        let out = pixelize_raster(&raster, 4, None).unwrap();
        let decoded = decode_raster(&out).unwrap();
        assert_eq!(decoded.dimensions(), (16, 16));
        assert_flat_blocks(&decoded, 4);
    }
}
