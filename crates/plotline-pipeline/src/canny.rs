//! Two-threshold gradient edge detection on a pre-blurred image.
//!
//! `imageproc::edges::canny` always applies its own sigma 1.4 Gaussian
//! before differentiating, which would double-blur after the 3×3 pre-pass
//! in [`crate::edge`]. This module runs the remaining Canny steps on the
//! image as given:
//!
//! 1. Sobel gradients (`imageproc` 3×3 kernels, border clamped).
//! 2. Euclidean gradient magnitude.
//! 3. Non-maximum suppression across the quantized gradient direction.
//! 4. Hysteresis: pixels strictly above `high` seed edges, which grow
//!    through 8-connected neighbours strictly above `low`.
//!
//! Hysteresis bounds-checks every neighbour, so seeds next to the image
//! border do not underflow (see image-rs/imageproc#705).

use image::{GrayImage, Luma};
use imageproc::definitions::{HasBlack, HasWhite, Image};
use imageproc::filter::filter_clamped;
use imageproc::kernel;

/// Detect edges in an already-smoothed image.
///
/// Returns a binary image: 255 for edge pixels, 0 elsewhere. `low` is
/// clamped to at most `high`.
#[must_use = "returns the binary edge map"]
pub fn canny_unblurred(image: &GrayImage, low: f32, high: f32) -> GrayImage {
    let low = low.min(high);
    let (w, h) = (image.width(), image.height());
    if w < 3 || h < 3 {
        return GrayImage::new(w, h);
    }

    let gx: Image<Luma<i16>> = filter_clamped(image, kernel::SOBEL_HORIZONTAL_3X3);
    let gy: Image<Luma<i16>> = filter_clamped(image, kernel::SOBEL_VERTICAL_3X3);
    let magnitude: Image<Luma<f32>> = Image::from_fn(w, h, |x, y| {
        let dx = f32::from(gx.get_pixel(x, y).0[0]);
        let dy = f32::from(gy.get_pixel(x, y).0[0]);
        Luma([dx.hypot(dy)])
    });

    let thinned = non_maximum_suppression(&magnitude, &gx, &gy);
    hysteresis(&thinned, low, high)
}

/// Direction of the gradient, folded into four bins.
#[derive(Clone, Copy)]
enum Direction {
    Horizontal,
    Diagonal,
    Vertical,
    AntiDiagonal,
}

impl Direction {
    fn of(dx: f32, dy: f32) -> Self {
        let mut angle = dy.atan2(dx).to_degrees();
        if angle < 0.0 {
            angle += 180.0;
        }
        if (22.5..67.5).contains(&angle) {
            Self::Diagonal
        } else if (67.5..112.5).contains(&angle) {
            Self::Vertical
        } else if (112.5..157.5).contains(&angle) {
            Self::AntiDiagonal
        } else {
            Self::Horizontal
        }
    }

    /// The two neighbours of `(x, y)` along the gradient.
    const fn neighbours(self, x: u32, y: u32) -> [(u32, u32); 2] {
        match self {
            Self::Horizontal => [(x - 1, y), (x + 1, y)],
            Self::Diagonal => [(x + 1, y + 1), (x - 1, y - 1)],
            Self::Vertical => [(x, y - 1), (x, y + 1)],
            Self::AntiDiagonal => [(x - 1, y + 1), (x + 1, y - 1)],
        }
    }
}

/// Keep only pixels that are local maxima along their gradient direction.
///
/// The one-pixel border is always suppressed.
fn non_maximum_suppression(
    magnitude: &Image<Luma<f32>>,
    gx: &Image<Luma<i16>>,
    gy: &Image<Luma<i16>>,
) -> Image<Luma<f32>> {
    let (w, h) = (magnitude.width(), magnitude.height());
    let mut out = Image::from_pixel(w, h, Luma([0.0]));
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let direction = Direction::of(
                f32::from(gx.get_pixel(x, y).0[0]),
                f32::from(gy.get_pixel(x, y).0[0]),
            );
            let value = magnitude.get_pixel(x, y).0[0];
            let is_max = direction
                .neighbours(x, y)
                .iter()
                .all(|&(nx, ny)| value >= magnitude.get_pixel(nx, ny).0[0]);
            if is_max {
                out.put_pixel(x, y, Luma([value]));
            }
        }
    }
    out
}

/// Grow edges from strong seeds through weak, 8-connected pixels.
fn hysteresis(input: &Image<Luma<f32>>, low: f32, high: f32) -> GrayImage {
    const OFFSETS: [(i64, i64); 8] = [
        (-1, -1),
        (0, -1),
        (1, -1),
        (-1, 0),
        (1, 0),
        (-1, 1),
        (0, 1),
        (1, 1),
    ];

    let (w, h) = (input.width(), input.height());
    let mut out = GrayImage::from_pixel(w, h, Luma::black());
    let mut stack = Vec::new();

    for y in 0..h {
        for x in 0..w {
            if input.get_pixel(x, y).0[0] <= high || out.get_pixel(x, y).0[0] != 0 {
                continue;
            }
            out.put_pixel(x, y, Luma::white());
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                for (ox, oy) in OFFSETS {
                    let nx = i64::from(cx) + ox;
                    let ny = i64::from(cy) + oy;
                    let (Ok(nx), Ok(ny)) = (u32::try_from(nx), u32::try_from(ny)) else {
                        continue;
                    };
                    if nx >= w || ny >= h {
                        continue;
                    }
                    if input.get_pixel(nx, ny).0[0] > low && out.get_pixel(nx, ny).0[0] == 0 {
                        out.put_pixel(nx, ny, Luma::white());
                        stack.push((nx, ny));
                    }
                }
            }
        }
    }
    out
}
