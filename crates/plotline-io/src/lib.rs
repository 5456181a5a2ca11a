//! plotline-io: filesystem side of a conversion.
//!
//! Resolves an image identifier to a file, runs the pure pipeline, renders
//! both output documents, and writes them all-or-nothing. [`convert`] is
//! the single entry point a front-end calls.

pub mod error;
pub mod loader;
pub mod output;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use plotline_export::SvgMetadata;
use plotline_pipeline::{Parameters, PipelineConfig, PipelineDiagnostics};

pub use error::ConvertError;
pub use loader::{LoadedImage, candidate_paths, load_image};
pub use output::{OutputPaths, write_outputs};

/// Directory used for both image lookup and output by default.
pub const DEFAULT_IMAGE_DIR: &str = "images";

/// Where a conversion looks for images and writes its results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Directory searched for bare identifiers.
    pub image_dir: PathBuf,
    /// Directory receiving `<stem>.json` and `<stem>.svg`. Created if
    /// missing.
    pub output_dir: PathBuf,
    /// Pipeline policy knobs.
    pub pipeline: PipelineConfig,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            output_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            pipeline: PipelineConfig::default(),
        }
    }
}

/// What a successful conversion produced.
#[derive(Debug, Clone)]
pub struct ConvertOutcome {
    /// The image file that was converted.
    pub source: PathBuf,
    /// The files that were written.
    pub outputs: OutputPaths,
    /// Timing and counts for the run.
    pub diagnostics: PipelineDiagnostics,
}

/// Convert the image named by `identifier` into an interchange file and
/// an SVG preview.
///
/// Parameters are checked before the filesystem is touched. Outputs are
/// named after the identifier's file stem.
///
/// # Errors
///
/// Returns [`ConvertError::InvalidParameters`] for unusable parameters,
/// [`ConvertError::NotFound`] or [`ConvertError::DecodeFailure`] if the
/// image cannot be loaded, and [`ConvertError::Io`] if an output cannot be
/// written. On error no output file is left behind.
pub fn convert(
    identifier: &str,
    params: Parameters,
    config: &ConvertConfig,
) -> Result<ConvertOutcome, ConvertError> {
    params.validate()?;

    let loaded = load_image(identifier, &config.image_dir)?;
    let result = plotline_pipeline::vectorize(&loaded.image, params, &config.pipeline)?;

    let stem = output_stem(identifier);
    let description = format!(
        "contour divisor {}, hatch cell {}, contour repeat {}",
        params.contour_divisor, params.hatch_cell, params.contour_repeat
    );
    let json = plotline_export::to_json(&result.strokes)?;
    let svg = plotline_export::to_svg(
        &result.strokes,
        &SvgMetadata {
            title: Some(&stem),
            description: Some(&description),
        },
    );

    let outputs = OutputPaths::new(&config.output_dir, &stem);
    write_outputs(&outputs, &json, &svg)?;

    log::info!(
        "converted {} -> {} ({} strokes)",
        loaded.path.display(),
        outputs.json.display(),
        result.strokes.len()
    );

    Ok(ConvertOutcome {
        source: loaded.path,
        outputs,
        diagnostics: result.diagnostics,
    })
}

/// File stem used to name the outputs of `identifier`.
fn output_stem(identifier: &str) -> String {
    Path::new(identifier)
        .file_stem()
        .map_or_else(|| identifier.to_owned(), |s| s.to_string_lossy().into_owned())
}
