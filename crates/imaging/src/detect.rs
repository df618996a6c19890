//! Best-effort block size estimation from a capture of the host page.
//!
//! The estimate is the greatest common divisor of every run of identical
//! pixels that does not touch the capture edge, measured along rows and
//! columns. Anti-aliased or photographic captures collapse to 1 and yield
//! no estimate. Callers must treat the result as a hint only.

use image::{Rgba, RgbaImage};

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Fold the interior run lengths of one line of pixels into `acc`
fn fold_interior_runs<I>(pixels: I, acc: &mut Option<u32>)
where
    I: Iterator<Item = Rgba<u8>>,
{
    let mut runs: Vec<u32> = Vec::new();
    let mut current: Option<Rgba<u8>> = None;
    for pixel in pixels {
        if current == Some(pixel) {
            if let Some(len) = runs.last_mut() {
                *len += 1;
            }
        } else {
            runs.push(1);
            current = Some(pixel);
        }
    }

    // The first and last runs may be clipped by the capture edge.
    if runs.len() <= 2 {
        return;
    }
    for &len in &runs[1..runs.len() - 1] {
        *acc = Some(acc.map_or(len, |g| gcd(g, len)));
    }
}

/// Estimate the block size of a pixel-art capture.
///
/// Returns None when the capture is uniform, too small, or the estimate is
/// below 2 pixels.
pub fn estimate_block_size(capture: &RgbaImage) -> Option<u32> {
    let (width, height) = capture.dimensions();
    let mut acc = None;

    for y in 0..height {
        fold_interior_runs((0..width).map(|x| *capture.get_pixel(x, y)), &mut acc);
        if acc == Some(1) {
            return None;
        }
    }
    for x in 0..width {
        fold_interior_runs((0..height).map(|y| *capture.get_pixel(x, y)), &mut acc);
        if acc == Some(1) {
            return None;
        }
    }

    acc.filter(|&size| size >= 2)
}
