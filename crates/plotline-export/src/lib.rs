//! plotline-export: Pure stroke serializers (sans-IO)
//!
//! Converts a [`StrokeSet`](plotline_pipeline::StrokeSet) into the
//! interchange JSON consumed by the plotter controller and an SVG preview.
//! Writing files is left to `plotline-io`.

pub mod json;
pub mod svg;

pub use json::{from_json, to_json};
pub use svg::{SvgMetadata, to_svg};

/// Errors from serializing or parsing stroke documents.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// JSON serialization or parsing failed.
    #[error("interchange JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The serializer produced bytes that are not UTF-8.
    #[error("interchange JSON is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// A parsed stroke has fewer than two points.
    #[error("stroke {index} has {points} point(s), need at least 2")]
    DegenerateStroke {
        /// Position of the stroke in the document.
        index: usize,
        /// Number of points it had.
        points: usize,
    },
}
