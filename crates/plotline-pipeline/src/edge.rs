//! Binary edge masks for the contour pass.
//!
//! Two interchangeable backends sit behind the [`EdgeDetector`] trait:
//!
//! - [`EdgeBackend::Canny`] (default): 3×3 Gaussian blur, then the
//!   two-threshold gradient detector in [`crate::canny`] with fixed
//!   thresholds [`CANNY_LOW`] / [`CANNY_HIGH`].
//! - [`EdgeBackend::Sobel`]: a plain Sobel gradient magnitude with no
//!   thinning or hysteresis. Cheaper and noisier, used where the full
//!   detector is unavailable or too slow.
//!
//! The backend is a capability flag chosen once by the caller and carried
//! in [`PipelineConfig`](crate::PipelineConfig). Either way the result is
//! binarized at [`BINARY_THRESHOLD`], so the contour tracer only ever sees
//! 0 and 255.

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

use crate::blur;

/// Low hysteresis threshold for the Canny backend.
pub const CANNY_LOW: f32 = 100.0;
/// High hysteresis threshold for the Canny backend.
pub const CANNY_HIGH: f32 = 200.0;
const _: () = assert!(CANNY_LOW <= CANNY_HIGH);

/// Pixels strictly above this level are edges in the final mask.
pub const BINARY_THRESHOLD: u8 = 128;

/// Selects which edge detector builds the contour mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgeBackend {
    /// Gaussian blur followed by Canny non-maximum suppression and
    /// hysteresis.
    #[default]
    Canny,
    /// Sobel gradient magnitude, thresholded directly.
    Sobel,
}

/// Trait for edge detection strategies.
///
/// Input: an intensity image. Output: a binary mask of the same size where
/// 255 marks an edge pixel.
pub trait EdgeDetector {
    /// Build the edge mask for `image`.
    fn detect(&self, image: &GrayImage) -> GrayImage;
}

impl EdgeDetector for EdgeBackend {
    fn detect(&self, image: &GrayImage) -> GrayImage {
        let raw = match *self {
            Self::Canny => {
                crate::canny::canny_unblurred(&blur::gaussian_blur_3x3(image), CANNY_LOW, CANNY_HIGH)
            }
            Self::Sobel => sobel_magnitude(image),
        };
        binarize(&raw, BINARY_THRESHOLD)
    }
}

/// Sobel gradient magnitude with clamped borders.
///
/// The magnitude is truncated to an integer by
/// [`imageproc::gradients::sobel_gradients`] and saturated to 255 here.
#[must_use = "returns the gradient magnitude image"]
#[allow(clippy::cast_possible_truncation)]
pub fn sobel_magnitude(image: &GrayImage) -> GrayImage {
    let magnitude = imageproc::gradients::sobel_gradients(image);
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([magnitude.get_pixel(x, y).0[0].min(255) as u8])
    })
}

/// Map every pixel to 255 if it is strictly above `threshold`, else 0.
#[must_use = "returns the binary mask"]
pub fn binarize(image: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > threshold { 255 } else { 0 };
    }
    out
}

/// Number of set pixels in a binary mask.
#[must_use]
pub fn edge_pixel_count(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p.0[0] > 0).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sharp_edge_image() -> GrayImage {
        GrayImage::from_fn(20, 20, |x, _y| Luma([if x < 10 { 0 } else { 255 }]))
    }

    #[test]
    fn default_backend_is_canny() {
        assert_eq!(EdgeBackend::default(), EdgeBackend::Canny);
    }

    #[test]
    fn uniform_image_produces_no_edges() {
        for backend in [EdgeBackend::Canny, EdgeBackend::Sobel] {
            for level in [0, 128, 255] {
                let img = GrayImage::from_pixel(20, 20, Luma([level]));
                let edges = backend.detect(&img);
                assert_eq!(
                    edge_pixel_count(&edges),
                    0,
                    "{backend:?} found edges in uniform {level} image"
                );
            }
        }
    }

    #[test]
    fn sharp_edge_detected_by_both_backends() {
        for backend in [EdgeBackend::Canny, EdgeBackend::Sobel] {
            let edges = backend.detect(&sharp_edge_image());
            assert!(edge_pixel_count(&edges) > 0, "{backend:?} missed the edge");
        }
    }

    #[test]
    fn masks_are_binary_and_same_size() {
        for backend in [EdgeBackend::Canny, EdgeBackend::Sobel] {
            let edges = backend.detect(&sharp_edge_image());
            assert_eq!((edges.width(), edges.height()), (20, 20));
            assert!(edges.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        }
    }

    #[test]
    fn sobel_saturates_strong_gradients() {
        let mag = sobel_magnitude(&sharp_edge_image());
        // |gx| = 4 * 255 at the boundary, well past 255.
        assert_eq!(mag.get_pixel(9, 5).0[0], 255);
        assert_eq!(mag.get_pixel(3, 5).0[0], 0);
    }

    #[test]
    fn sobel_weak_gradient_stays_below_threshold() {
        // A step of 20 levels gives |gx| = 80 < 128.
        let img = GrayImage::from_fn(10, 10, |x, _| Luma([if x < 5 { 100 } else { 120 }]));
        assert_eq!(edge_pixel_count(&EdgeBackend::Sobel.detect(&img)), 0);
    }

    #[test]
    fn sobel_border_is_clamped() {
        // A bright first column: clamping repeats it outward, so the
        // border column sees the same step as its neighbour.
        let img = GrayImage::from_fn(6, 6, |x, _| Luma([if x == 0 { 10 } else { 0 }]));
        let mag = sobel_magnitude(&img);
        // |gx| = 4 * 10 on columns 0 and 1, nothing further right.
        assert_eq!(mag.get_pixel(0, 3).0[0], 40);
        assert_eq!(mag.get_pixel(1, 3).0[0], 40);
        assert_eq!(mag.get_pixel(2, 3).0[0], 0);
    }

    #[test]
    fn binarize_is_strictly_greater() {
        let img = GrayImage::from_fn(3, 1, |x, _| Luma([[128, 129, 0][x as usize]]));
        let out = binarize(&img, BINARY_THRESHOLD);
        assert_eq!(out.as_raw(), &vec![0, 255, 0]);
    }
}
