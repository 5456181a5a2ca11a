//! Conversion error taxonomy.

use std::path::PathBuf;

use plotline_export::ExportError;
use plotline_pipeline::PipelineError;

/// Errors that end a conversion request.
///
/// None of them are retried, and none leave partial output behind.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// No candidate path for the identifier exists.
    #[error("image not found: {identifier} (tried {} paths)", tried.len())]
    NotFound {
        /// The identifier as given.
        identifier: String,
        /// Every path that was checked, in order.
        tried: Vec<PathBuf>,
    },

    /// A parameter cannot produce a usable working resolution, or both
    /// passes are disabled.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// A candidate file exists but is not a supported raster image.
    #[error("failed to decode {}: {source}", path.display())]
    DecodeFailure {
        /// The file that failed to decode.
        path: PathBuf,
        /// Why it failed.
        #[source]
        source: PipelineError,
    },

    /// Reading the source or writing an output file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Rendering an output document failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// The pipeline failed for a reason other than its parameters.
    #[error(transparent)]
    Pipeline(PipelineError),
}

impl ConvertError {
    /// Whether the user can fix this by picking another image or other
    /// parameters.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::InvalidParameters(_))
    }
}

impl From<PipelineError> for ConvertError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidParameters(msg) => Self::InvalidParameters(msg),
            other => Self::Pipeline(other),
        }
    }
}
