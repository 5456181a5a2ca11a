//! Resizing to a pass's working resolution.
//!
//! The contour and hatch passes each work on their own resized copy of the
//! source. A pass with divisor `d` works at `resolution / d` pixels wide,
//! keeping the source aspect ratio, and scales its output coordinates back
//! up by `d`. Small divisors therefore trace more detail, and large hatch
//! cells produce a coarser grid.

use std::fmt;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, PipelineError};

/// Largest working width or height a pass may request.
pub const MAX_WORKING_DIMENSION: u32 = 16_384;

/// Resampling filter used when resizing to working resolution.
///
/// Ordered from fastest/lowest-quality to slowest/highest-quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResizeFilter {
    /// Nearest-neighbor: fastest, blocky artifacts.
    Nearest,
    /// Bilinear interpolation: fast, decent quality.
    Triangle,
    /// Bicubic (Catmull-Rom): moderate speed, good quality.
    #[default]
    CatmullRom,
    /// Gaussian: moderate speed, smooth output.
    Gaussian,
    /// Lanczos with 3 lobes: slowest, sharpest.
    Lanczos3,
}

impl ResizeFilter {
    /// Convert to the `image` crate's `FilterType`.
    const fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            Self::Nearest => image::imageops::FilterType::Nearest,
            Self::Triangle => image::imageops::FilterType::Triangle,
            Self::CatmullRom => image::imageops::FilterType::CatmullRom,
            Self::Gaussian => image::imageops::FilterType::Gaussian,
            Self::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

impl fmt::Display for ResizeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nearest => f.write_str("Nearest"),
            Self::Triangle => f.write_str("Triangle"),
            Self::CatmullRom => f.write_str("CatmullRom"),
            Self::Gaussian => f.write_str("Gaussian"),
            Self::Lanczos3 => f.write_str("Lanczos3"),
        }
    }
}

/// Compute the working size for a pass.
///
/// The width is `floor(resolution / divisor)` and the height follows the
/// source aspect ratio, also floored.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidParameters`] if the divisor is not a
/// positive finite number, or the result has a zero side or exceeds
/// [`MAX_WORKING_DIMENSION`].
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_lossless
)]
pub fn working_size(
    source: Dimensions,
    resolution: u32,
    divisor: f64,
) -> Result<Dimensions, PipelineError> {
    if !divisor.is_finite() || divisor <= 0.0 {
        return Err(PipelineError::InvalidParameters(format!(
            "divisor must be positive, got {divisor}"
        )));
    }
    if source.width == 0 || source.height == 0 {
        return Err(PipelineError::InvalidParameters(
            "source image has no pixels".to_owned(),
        ));
    }

    let width = (f64::from(resolution) / divisor).floor();
    let height = (f64::from(resolution) / divisor * f64::from(source.height)
        / f64::from(source.width))
    .floor();

    if width < 1.0 || height < 1.0 {
        return Err(PipelineError::InvalidParameters(format!(
            "divisor {divisor} reduces a {resolution}px resolution to a {width}x{height} working image"
        )));
    }
    let max = f64::from(MAX_WORKING_DIMENSION);
    if width > max || height > max {
        return Err(PipelineError::InvalidParameters(format!(
            "divisor {divisor} expands a {resolution}px resolution past {MAX_WORKING_DIMENSION}px"
        )));
    }

    Ok(Dimensions {
        width: width as u32,
        height: height as u32,
    })
}

/// Resize `image` to exactly `size` with the given filter.
///
/// Returns an owned copy unchanged when the size already matches.
#[must_use = "returns the resized image"]
pub fn resize(image: &GrayImage, size: Dimensions, filter: ResizeFilter) -> GrayImage {
    if Dimensions::of(image) == size {
        return image.clone();
    }
    image::imageops::resize(image, size.width, size.height, filter.to_image_filter())
}
