//! Density hatching: shade an image with short strokes on a coarse grid.
//!
//! Each pixel of the (already downsampled) image is one hatch cell. The
//! cell's intensity picks a [`Band`], and the band picks a fixed stroke
//! template; darker bands draw strictly more ink:
//!
//! | band          | strokes                                           |
//! |---------------|---------------------------------------------------|
//! | [`Band::Blank`]  | none                                           |
//! | [`Band::Light`]  | horizontal at ¼ cell height                    |
//! | [`Band::Medium`] | horizontal, plus a diagonal from top-right to bottom-left |
//! | [`Band::Dark`]   | horizontal, diagonal, plus a horizontal at ¾ cell height |
//!
//! Horizontal and diagonal strokes collect into two sequences in row-major
//! scan order. Each sequence is then merged pairwise in order: a stroke
//! that starts where the current run ends extends the run. Only
//! consecutive entries are compared, so the result depends on scan order.
//!
//! Geometry is built in grid units (one unit per cell), where every
//! coordinate is a multiple of ¼ and comparisons are exact, and scaled to
//! output units at the end.

use image::GrayImage;

use crate::types::{Point, Polyline, Traced};

/// Cells brighter than this are left blank.
pub const BLANK_ABOVE: u8 = 144;
/// Cells brighter than this (and not blank) get one horizontal stroke.
pub const LIGHT_ABOVE: u8 = 64;
/// Cells brighter than this (and not light) also get a diagonal.
pub const MEDIUM_ABOVE: u8 = 16;

/// Shading band of one hatch cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    /// Above [`BLANK_ABOVE`]: no strokes.
    Blank,
    /// Above [`LIGHT_ABOVE`]: one horizontal stroke.
    Light,
    /// Above [`MEDIUM_ABOVE`]: horizontal and diagonal strokes.
    Medium,
    /// Everything darker: two horizontals and a diagonal.
    Dark,
}

impl Band {
    /// Classify a cell intensity.
    #[must_use]
    pub const fn classify(level: u8) -> Self {
        if level > BLANK_ABOVE {
            Self::Blank
        } else if level > LIGHT_ABOVE {
            Self::Light
        } else if level > MEDIUM_ABOVE {
            Self::Medium
        } else {
            Self::Dark
        }
    }
}

/// A straight stroke from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Where the pen goes down.
    pub start: Point,
    /// Where the pen lifts.
    pub end: Point,
}

impl Segment {
    const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    fn into_polyline(self, scale: f64) -> Polyline {
        Polyline::new(vec![self.start, self.end]).scaled(scale)
    }
}

/// Unmerged hatch strokes in grid units, split by direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HatchSegments {
    /// Horizontal strokes, in scan order.
    pub horizontal: Vec<Segment>,
    /// Diagonal strokes, in scan order.
    pub diagonal: Vec<Segment>,
}

/// Emit the stroke template of every cell, scanning rows top to bottom and
/// cells left to right.
#[must_use]
pub fn hatch_segments(image: &GrayImage) -> HatchSegments {
    let mut out = HatchSegments::default();
    for (y0, x0, pixel) in image
        .enumerate_pixels()
        .map(|(x, y, p)| (f64::from(y), f64::from(x), p))
    {
        let band = Band::classify(pixel.0[0]);
        if band == Band::Blank {
            continue;
        }
        out.horizontal.push(Segment::new(
            Point::new(x0, y0 + 0.25),
            Point::new(x0 + 1.0, y0 + 0.25),
        ));
        if band == Band::Light {
            continue;
        }
        out.diagonal.push(Segment::new(
            Point::new(x0 + 1.0, y0),
            Point::new(x0, y0 + 1.0),
        ));
        if band == Band::Dark {
            out.horizontal.push(Segment::new(
                Point::new(x0, y0 + 0.75),
                Point::new(x0 + 1.0, y0 + 0.75),
            ));
        }
    }
    out
}

/// Merge consecutive segments where one ends exactly where the next starts.
///
/// Each run keeps only its outer endpoints.
#[must_use]
pub fn merge_runs(segments: &[Segment]) -> Vec<Segment> {
    let mut runs: Vec<Segment> = Vec::with_capacity(segments.len());
    for &segment in segments {
        match runs.last_mut() {
            Some(run) if run.end == segment.start => run.end = segment.end,
            _ => runs.push(segment),
        }
    }
    runs
}

/// Hatch `image` and scale the strokes by `cell`.
///
/// Returns merged horizontal runs followed by merged diagonal runs, each
/// as a two-point polyline.
#[must_use]
pub fn hatch(image: &GrayImage, cell: f64) -> Traced {
    let segments = hatch_segments(image);
    let horizontal = merge_runs(&segments.horizontal);
    let diagonal = merge_runs(&segments.diagonal);

    log::debug!(
        "hatched {} horizontal and {} diagonal strokes into {} + {} runs",
        segments.horizontal.len(),
        segments.diagonal.len(),
        horizontal.len(),
        diagonal.len(),
    );

    let polylines = horizontal
        .into_iter()
        .chain(diagonal)
        .map(|s| s.into_polyline(cell))
        .collect();
    Traced {
        polylines,
        raw: segments.horizontal.len() + segments.diagonal.len(),
    }
}
