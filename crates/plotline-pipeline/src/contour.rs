//! Contour tracing: turn a binary edge mask into polylines.
//!
//! The tracer works on scanlines rather than following borders:
//!
//! 1. Each scanline's runs of edge pixels are reduced to one "dot" at the
//!    run's first column.
//! 2. Dots are linked to the nearest dot of the previous scanline when the
//!    column gap is at most [`LINK_MAX_COLUMN_GAP`], growing contours
//!    downward.
//! 3. Steps 1–2 run twice, once along rows and once along columns
//!    ([`Axis`]), since a row scan cannot follow horizontal edges.
//! 4. Contours whose end lies within [`MERGE_MAX_DISTANCE`] of another's
//!    start are joined, in a single pass over all ordered pairs.
//! 5. Every [`KEEP_EVERY_NTH`]th point is kept, contours with fewer than
//!    two points are dropped, and coordinates are scaled by the pass's
//!    density divisor.
//!
//! All iteration is in index order, so the output is deterministic for a
//! given mask.

use image::GrayImage;

use crate::types::{Point, Polyline, Traced};

/// Largest column gap that still links a dot to the previous scanline.
pub const LINK_MAX_COLUMN_GAP: u32 = 3;

/// Contours whose end and start are closer than this are merged.
pub const MERGE_MAX_DISTANCE: f64 = 8.0;

/// Downsampling stride applied to merged contours.
pub const KEEP_EVERY_NTH: usize = 8;

/// Scan orientation over the edge mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Scanlines are image rows.
    Rows,
    /// Scanlines are image columns (the mask transposed).
    Columns,
}

impl Axis {
    /// Scan-space `(columns, scanlines)` for a mask of `width`×`height`.
    const fn scan_size(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            Self::Rows => (width, height),
            Self::Columns => (height, width),
        }
    }

    /// Whether scan-space cell `(col, line)` is set in `mask`.
    fn is_set(self, mask: &GrayImage, col: u32, line: u32) -> bool {
        let (x, y) = match self {
            Self::Rows => (col, line),
            Self::Columns => (line, col),
        };
        mask.get_pixel(x, y).0[0] > 0
    }

    /// Map a scan-space `(col, line)` back to an image-space point.
    fn to_point(self, col: u32, line: u32) -> Point {
        match self {
            Self::Rows => Point::new(f64::from(col), f64::from(line)),
            Self::Columns => Point::new(f64::from(line), f64::from(col)),
        }
    }
}

/// Trace contours in `mask` and scale them by `divisor`.
///
/// Polylines with fewer than two points never appear in the output.
#[must_use]
pub fn trace_contours(mask: &GrayImage, divisor: f64) -> Traced {
    let mut contours = trace_axis(mask, Axis::Rows);
    contours.extend(trace_axis(mask, Axis::Columns));
    let raw = contours.len();

    let merged = merge_contours(contours);
    let polylines: Vec<Polyline> = merged
        .into_iter()
        .map(|points| {
            points
                .into_iter()
                .step_by(KEEP_EVERY_NTH)
                .collect::<Vec<_>>()
        })
        .filter(|points| points.len() >= 2)
        .map(|points| Polyline::new(points).scaled(divisor))
        .collect();

    log::debug!(
        "traced {raw} raw contours, {} after merge and thinning",
        polylines.len()
    );
    Traced { polylines, raw }
}

/// Run the dot scan and vertical linking along one axis, returning
/// image-space contours.
fn trace_axis(mask: &GrayImage, axis: Axis) -> Vec<Vec<Point>> {
    let dots = find_dots(mask, axis);
    connect_dots(&dots)
        .into_iter()
        .map(|contour| {
            contour
                .into_iter()
                .map(|(col, line)| axis.to_point(col, line))
                .collect()
        })
        .collect()
}

/// Reduce each scanline to the start columns of its runs of set pixels.
///
/// The last scanline and the first column are not scanned; neither edge
/// detector marks the outermost border.
#[must_use]
pub fn find_dots(mask: &GrayImage, axis: Axis) -> Vec<Vec<u32>> {
    let (cols, lines) = axis.scan_size(mask.width(), mask.height());
    (0..lines.saturating_sub(1))
        .map(|line| {
            let mut row = Vec::new();
            let mut in_run = false;
            for col in 1..cols {
                let set = axis.is_set(mask, col, line);
                if set && !in_run {
                    row.push(col);
                }
                in_run = set;
            }
            row
        })
        .collect()
}

/// Link dots into contours of scan-space `(col, line)` points.
///
/// A dot continues the contour that ends at the nearest dot of the
/// previous scanline (first one wins on ties) when the gap is at most
/// [`LINK_MAX_COLUMN_GAP`]. A contour can only be continued once per
/// scanline; any other dot starts a new contour.
#[must_use]
pub fn connect_dots(dots: &[Vec<u32>]) -> Vec<Vec<(u32, u32)>> {
    let mut contours: Vec<Vec<(u32, u32)>> = Vec::new();
    // For each dot of the previous scanline, the contour ending there.
    let mut open_ends: Vec<Option<usize>> = Vec::new();

    for (line, row) in (0_u32..).zip(dots) {
        let previous = line.checked_sub(1).and_then(|l| dots.get(l as usize));
        let mut ends = Vec::with_capacity(row.len());

        for &col in row {
            let continued = previous
                .and_then(|prev| nearest(prev, col))
                .filter(|&(_, prev_col)| prev_col.abs_diff(col) <= LINK_MAX_COLUMN_GAP)
                .and_then(|(idx, _)| open_ends.get_mut(idx).and_then(Option::take));

            let contour = if let Some(contour) = continued {
                contours[contour].push((col, line));
                contour
            } else {
                contours.push(vec![(col, line)]);
                contours.len() - 1
            };
            ends.push(Some(contour));
        }
        open_ends = ends;
    }
    contours
}

/// Index and column of the dot in `row` closest to `col`; the first one on
/// ties.
fn nearest(row: &[u32], col: u32) -> Option<(usize, u32)> {
    let mut best: Option<(usize, u32)> = None;
    for (idx, &candidate) in row.iter().enumerate() {
        match best {
            Some((_, b)) if b.abs_diff(col) <= candidate.abs_diff(col) => {}
            _ => best = Some((idx, candidate)),
        }
    }
    best
}

/// Append contour `j` to contour `i` whenever `i`'s end is within
/// [`MERGE_MAX_DISTANCE`] of `j`'s start.
///
/// Every ordered pair is tested once, in index order, against the contours
/// as they stand at that moment. This is a single pass: a chain whose
/// links are discovered out of order can stay split. Consumed contours are
/// removed from the result.
///
/// The pair `(i, i)` is tested too. A contour whose own end lies within
/// the merge distance of its start consumes itself and is dropped, so
/// short fragments and closed loops vanish unless an earlier contour
/// already absorbed them.
#[must_use]
pub fn merge_contours(mut contours: Vec<Vec<Point>>) -> Vec<Vec<Point>> {
    let n = contours.len();
    for i in 0..n {
        for j in 0..n {
            let (Some(end), Some(start)) = (
                contours[i].last().copied(),
                contours[j].first().copied(),
            ) else {
                continue;
            };
            if end.distance(start) >= MERGE_MAX_DISTANCE {
                continue;
            }
            if i == j {
                contours[i].clear();
            } else {
                let tail = std::mem::take(&mut contours[j]);
                contours[i].extend(tail);
            }
        }
    }
    contours.retain(|c| !c.is_empty());
    contours
}
