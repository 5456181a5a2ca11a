//! Image decoding and luminance conversion.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, TIFF, WebP) and produces the
//! single-channel intensity buffer every later stage works on.

use image::GrayImage;

use crate::types::PipelineError;

/// Decode raw image bytes and convert to 8-bit luminance.
///
/// Uses the `image` crate's luma conversion (Rec. 601 weights), so green
/// contributes the most and blue the least. Alpha is discarded.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode_luma(bytes: &[u8]) -> Result<GrayImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    log::debug!("decoded {}x{} image", img.width(), img.height());
    Ok(img.into_luma8())
}
