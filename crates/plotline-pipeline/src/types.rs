//! Shared types for the plotline vectorization pipeline.

use serde::{Deserialize, Serialize};

use crate::downsample::ResizeFilter;
use crate::edge::EdgeBackend;

/// Re-export `GrayImage` so downstream crates can hand decoded intensity
/// buffers to the pipeline without depending on `image` directly.
pub use image::GrayImage;

/// A 2D point in plotter space.
///
/// Coordinates start out as working-resolution pixel positions and are
/// multiplied by the contour divisor or hatch cell size, so they are not
/// pixel-integral in general.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (from the left edge).
    pub x: f64,
    /// Vertical position (from the top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Multiply both coordinates by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

/// An ordered sequence of points drawn with the pen down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// Consumes the polyline and returns it drawn in the opposite direction.
    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.0.reverse();
        self
    }

    /// Scale every point by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self(self.0.into_iter().map(|p| p.scaled(factor)).collect())
    }

    /// Length of the pen-down path along the polyline.
    #[must_use]
    pub fn path_length(&self) -> f64 {
        self.0.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// The final, ordered set of strokes in pen-travel order.
///
/// Every polyline in a `StrokeSet` has at least two points:
/// [`from_polylines`](Self::from_polylines) drops shorter ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrokeSet(Vec<Polyline>);

impl StrokeSet {
    /// Build a stroke set, dropping polylines with fewer than two points.
    #[must_use]
    pub fn from_polylines(polylines: Vec<Polyline>) -> Self {
        let before = polylines.len();
        let kept: Vec<Polyline> = polylines.into_iter().filter(|p| p.len() >= 2).collect();
        if kept.len() != before {
            log::debug!("dropped {} degenerate strokes", before - kept.len());
        }
        Self(kept)
    }

    /// Returns `true` if there are no strokes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of strokes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// The strokes, in drawing order.
    #[must_use]
    pub fn strokes(&self) -> &[Polyline] {
        &self.0
    }

    /// Consumes the set and returns the strokes in drawing order.
    #[must_use]
    pub fn into_strokes(self) -> Vec<Polyline> {
        self.0
    }

    /// Total number of points across all strokes.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.0.iter().map(Polyline::len).sum()
    }

    /// Total pen-up distance: the sum of gaps between the end of each
    /// stroke and the start of the next.
    #[must_use]
    pub fn travel_distance(&self) -> f64 {
        travel_distance(&self.0)
    }

    /// Largest `x` and `y` coordinates over all strokes, or `(0, 0)`
    /// when empty.
    #[must_use]
    pub fn max_extent(&self) -> (f64, f64) {
        self.0
            .iter()
            .flat_map(Polyline::points)
            .fold((0.0_f64, 0.0_f64), |(mx, my), p| (mx.max(p.x), my.max(p.y)))
    }
}

/// Sum of the gaps between consecutive polylines' end and start points.
#[must_use]
pub fn travel_distance(polylines: &[Polyline]) -> f64 {
    polylines
        .windows(2)
        .filter_map(|pair| Some(pair[0].last()?.distance(*pair[1].first()?)))
        .sum()
}

/// Output of one extraction pass, before tour optimization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Traced {
    /// Merged polylines in output units.
    pub polylines: Vec<Polyline>,
    /// Contour fragments or hatch segments before merging.
    pub raw: usize,
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Dimensions of an existing image.
    #[must_use]
    pub fn of(image: &GrayImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }
}

/// The three user-facing knobs of a conversion.
///
/// A zero `contour_divisor` disables the contour pass and a zero
/// `hatch_cell` disables hatching. At least one of them must be enabled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Contour density divisor: the contour pass works at
    /// `resolution / contour_divisor` pixels wide and scales its output
    /// back up by the same factor.
    pub contour_divisor: f64,

    /// Hatch cell size in output units; one cell per working pixel.
    pub hatch_cell: f64,

    /// Extra passes over the contour tour, so outlines stand out.
    pub contour_repeat: u32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            contour_divisor: Self::DEFAULT_CONTOUR_DIVISOR,
            hatch_cell: Self::DEFAULT_HATCH_CELL,
            contour_repeat: Self::DEFAULT_CONTOUR_REPEAT,
        }
    }
}

impl Parameters {
    /// Default contour density divisor.
    pub const DEFAULT_CONTOUR_DIVISOR: f64 = 2.0;
    /// Default hatch cell size.
    pub const DEFAULT_HATCH_CELL: f64 = 16.0;
    /// Default number of extra contour passes.
    pub const DEFAULT_CONTOUR_REPEAT: u32 = 0;

    /// Whether the contour pass runs.
    #[must_use]
    pub fn contours_enabled(&self) -> bool {
        self.contour_divisor > 0.0
    }

    /// Whether the hatch pass runs.
    #[must_use]
    pub fn hatching_enabled(&self) -> bool {
        self.hatch_cell > 0.0
    }

    /// Check that both knobs are finite and non-negative and that at least
    /// one pass is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidParameters`] describing the first
    /// violated constraint.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (name, value) in [
            ("contour divisor", self.contour_divisor),
            ("hatch cell size", self.hatch_cell),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PipelineError::InvalidParameters(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        if !self.contours_enabled() && !self.hatching_enabled() {
            return Err(PipelineError::InvalidParameters(
                "contours and hatching are both disabled".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the vectorization pipeline.
///
/// Holds the policy knobs that the front-end does not expose to users.
/// The three user knobs live in [`Parameters`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Working-resolution numerator. Each pass resizes the source to
    /// `resolution / divisor` pixels wide. `None` uses the source width,
    /// so output coordinates stay in source pixel units.
    pub resolution: Option<u32>,

    /// Percentage of the histogram clipped from each end before the
    /// autocontrast stretch. Must be in `[0, 50)`.
    pub autocontrast_cutoff: f64,

    /// Which edge detector builds the contour mask.
    pub edge_backend: EdgeBackend,

    /// Resampling filter used when resizing to working resolution.
    pub resize_filter: ResizeFilter,

    /// Run the contour and hatch passes on separate threads.
    pub parallel: bool,
}

impl PipelineConfig {
    /// Default autocontrast clip percentage.
    pub const DEFAULT_AUTOCONTRAST_CUTOFF: f64 = 10.0;
    /// Default resampling filter.
    pub const DEFAULT_RESIZE_FILTER: ResizeFilter = ResizeFilter::CatmullRom;
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resolution: None,
            autocontrast_cutoff: Self::DEFAULT_AUTOCONTRAST_CUTOFF,
            edge_backend: EdgeBackend::default(),
            resize_filter: Self::DEFAULT_RESIZE_FILTER,
            parallel: true,
        }
    }
}

/// Errors that can occur during pipeline processing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// A parameter or configuration value cannot produce a usable
    /// working resolution.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}
