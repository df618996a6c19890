//! Host page pixel size detection strategies

use image::RgbaImage;
use pixel_overlay_imaging::estimate_block_size;

/// Best-effort detection of the host page's pixel grid.
///
/// The result is a hint; None means "not detected" and never blocks anything.
pub trait PixelSizeDetector {
    fn detect(&self) -> Option<u32>;
}

impl<F> PixelSizeDetector for F
where
    F: Fn() -> Option<u32>,
{
    fn detect(&self) -> Option<u32> {
        self()
    }
}

/// Detector for pages with nothing to inspect
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDetector;

impl PixelSizeDetector for NoDetector {
    fn detect(&self) -> Option<u32> {
        None
    }
}

/// Estimates the block size from a capture of the host page's canvas
#[derive(Debug, Clone)]
pub struct CaptureDetector {
    capture: RgbaImage,
}

impl CaptureDetector {
    pub fn new(capture: RgbaImage) -> Self {
        Self { capture }
    }
}

impl PixelSizeDetector for CaptureDetector {
    fn detect(&self) -> Option<u32> {
        let estimate = estimate_block_size(&self.capture);
        tracing::debug!(
            "Pixel size estimate from {}x{} capture: {:?}",
            self.capture.width(),
            self.capture.height(),
            estimate
        );
        estimate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_no_detector() {
        assert_eq!(NoDetector.detect(), None);
    }

    #[test]
    fn test_closure_detector() {
        let detector = || Some(12u32);
        assert_eq!(detector.detect(), Some(12));
    }

    #[test]
    fn test_capture_detector() {
        let capture = RgbaImage::from_fn(40, 40, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        assert_eq!(CaptureDetector::new(capture).detect(), Some(4));
    }
}
