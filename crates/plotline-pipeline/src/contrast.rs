//! Histogram-clipping autocontrast.
//!
//! Photographs rarely use the whole 0–255 range, and both the edge
//! thresholds and the hatch bands are absolute intensity levels. Stretching
//! the histogram first makes those fixed constants behave consistently
//! across exposures.
//!
//! The stretch discards `cutoff` percent of the pixels from each end of
//! the histogram, then maps the darkest and lightest surviving levels to 0
//! and 255. Images with a single surviving level (uniform images) are left
//! unchanged.

use image::{GrayImage, Luma};
use imageproc::stats::histogram;

use crate::types::PipelineError;

/// Stretch `image` so the clipped histogram spans the full 0–255 range.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidParameters`] if `cutoff` is not a
/// finite percentage in `[0, 50)`.
pub fn autocontrast(image: &GrayImage, cutoff: f64) -> Result<GrayImage, PipelineError> {
    if !cutoff.is_finite() || !(0.0..50.0).contains(&cutoff) {
        return Err(PipelineError::InvalidParameters(format!(
            "autocontrast cutoff must be in [0, 50), got {cutoff}"
        )));
    }

    let luma = histogram(image).channels[0];
    let lut = stretch_table(&luma.map(u64::from), cutoff);
    Ok(GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([lut[usize::from(image.get_pixel(x, y).0[0])]])
    }))
}

/// Build the 256-entry lookup table for a clipped linear stretch.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn stretch_table(hist: &[u64; 256], cutoff: f64) -> [u8; 256] {
    let total: u64 = hist.iter().sum();
    let cut = (total as f64 * cutoff / 100.0) as u64;

    let mut clipped = *hist;
    clip(clipped.iter_mut(), cut);
    clip(clipped.iter_mut().rev(), cut);

    let lo = clipped.iter().position(|&n| n > 0);
    let hi = clipped.iter().rposition(|&n| n > 0);

    let mut lut = [0_u8; 256];
    match (lo, hi) {
        (Some(lo), Some(hi)) if hi > lo => {
            // Exact integer stretch, truncated toward zero.
            for (level, entry) in lut.iter_mut().enumerate() {
                let v = level.saturating_sub(lo) * 255 / (hi - lo);
                *entry = v.min(255) as u8;
            }
        }
        _ => {
            for (level, entry) in lut.iter_mut().enumerate() {
                *entry = level as u8;
            }
        }
    }
    lut
}

/// Remove `cut` pixels from the histogram, walking bins in iterator order.
fn clip<'a>(bins: impl Iterator<Item = &'a mut u64>, mut cut: u64) {
    for bin in bins {
        if cut == 0 {
            break;
        }
        let taken = cut.min(*bin);
        *bin -= taken;
        cut -= taken;
    }
}
