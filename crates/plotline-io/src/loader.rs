//! Image identifier resolution and loading.
//!
//! An identifier is tried as a path first, then inside the image
//! directory as given, then inside the image directory with each of
//! [`CANDIDATE_EXTENSIONS`] appended. The first candidate that decodes
//! wins.

use std::fs;
use std::path::{Path, PathBuf};

use plotline_pipeline::GrayImage;
use plotline_pipeline::grayscale::decode_luma;

use crate::ConvertError;

/// Extensions appended to a bare identifier, in lookup order.
pub const CANDIDATE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "tif", "tiff", "webp"];

/// The ordered list of paths tried for `identifier`.
#[must_use]
pub fn candidate_paths(identifier: &str, image_dir: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(2 + CANDIDATE_EXTENSIONS.len());
    paths.push(PathBuf::from(identifier));
    paths.push(image_dir.join(identifier));
    paths.extend(
        CANDIDATE_EXTENSIONS
            .iter()
            .map(|ext| image_dir.join(format!("{identifier}.{ext}"))),
    );
    paths
}

/// A decoded source image and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// The candidate path that decoded.
    pub path: PathBuf,
    /// Luminance of the decoded image, before autocontrast.
    pub image: GrayImage,
}

/// Resolve `identifier` and decode the first candidate that works.
///
/// A candidate that exists but cannot be read or decoded is skipped, and
/// the next one is tried.
///
/// # Errors
///
/// Returns [`ConvertError::NotFound`] if no candidate exists. If some
/// candidate existed but none decoded, returns the first such failure:
/// [`ConvertError::DecodeFailure`] or [`ConvertError::Io`].
pub fn load_image(identifier: &str, image_dir: &Path) -> Result<LoadedImage, ConvertError> {
    let tried = candidate_paths(identifier, image_dir);
    let mut first_failure = None;

    for path in &tried {
        if !path.is_file() {
            continue;
        }
        let attempt = fs::read(path)
            .map_err(|source| ConvertError::Io {
                path: path.clone(),
                source,
            })
            .and_then(|bytes| {
                decode_luma(&bytes).map_err(|source| ConvertError::DecodeFailure {
                    path: path.clone(),
                    source,
                })
            });
        match attempt {
            Ok(image) => {
                log::debug!(
                    "loaded {} ({}x{})",
                    path.display(),
                    image.width(),
                    image.height()
                );
                return Ok(LoadedImage {
                    path: path.clone(),
                    image,
                });
            }
            Err(err) => {
                log::debug!("skipping candidate: {err}");
                if first_failure.is_none() {
                    first_failure = Some(err);
                }
            }
        }
    }

    Err(first_failure.unwrap_or_else(|| ConvertError::NotFound {
        identifier: identifier.to_owned(),
        tried,
    }))
}
