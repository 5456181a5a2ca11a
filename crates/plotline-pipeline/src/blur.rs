//! 3×3 Gaussian blur ahead of the Canny detector.
//!
//! Wraps [`imageproc::filter::filter_clamped`] with a fixed binomial
//! kernel. Borders repeat the nearest edge pixel.

use image::{GrayImage, Luma};
use imageproc::definitions::Image;
use imageproc::filter::filter_clamped;
use imageproc::kernel::Kernel;

/// Sum of the [`GAUSSIAN_3X3`] weights.
pub const GAUSSIAN_WEIGHT: i32 = 16;

/// Binomial approximation of a Gaussian with sigma ≈ 0.8, unnormalized.
pub const GAUSSIAN_3X3: Kernel<'static, i32> = Kernel::new(&[1, 2, 1, 2, 4, 2, 1, 2, 1], 3, 3);

/// Smooth `image` with the 3×3 Gaussian kernel, clamping at the borders.
///
/// This is the pre-pass of the Canny detector: it suppresses single-pixel
/// noise that would otherwise survive as short spurious contours.
#[must_use = "returns the blurred image"]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn gaussian_blur_3x3(image: &GrayImage) -> GrayImage {
    // At most 16 * 255, so the weighted sums fit in i16.
    let sums: Image<Luma<i16>> = filter_clamped(image, GAUSSIAN_3X3);
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let sum = i32::from(sums.get_pixel(x, y).0[0]);
        Luma([((sum + GAUSSIAN_WEIGHT / 2) / GAUSSIAN_WEIGHT) as u8])
    })
}
