//! Interchange format: the stroke list the plotter controller consumes.
//!
//! A JSON array of strokes, each an array of `[x, y]` pairs, in tour
//! order, indented with four spaces.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use plotline_pipeline::{Point, Polyline, StrokeSet};

use crate::ExportError;

/// Indentation used for interchange files.
const INDENT: &[u8] = b"    ";

/// Serialize `strokes` to interchange JSON.
///
/// # Errors
///
/// Returns [`ExportError::Json`] if serialization fails.
pub fn to_json(strokes: &StrokeSet) -> Result<String, ExportError> {
    let coords: Vec<Vec<[f64; 2]>> = strokes
        .strokes()
        .iter()
        .map(|stroke| stroke.points().iter().map(|p| [p.x, p.y]).collect())
        .collect();

    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    coords.serialize(&mut serializer)?;
    Ok(String::from_utf8(buf)?)
}

/// Parse interchange JSON back into a stroke set.
///
/// # Errors
///
/// Returns [`ExportError::Json`] if `text` is not an array of arrays of
/// `[x, y]` pairs, and [`ExportError::DegenerateStroke`] if any stroke has
/// fewer than two points.
pub fn from_json(text: &str) -> Result<StrokeSet, ExportError> {
    let coords: Vec<Vec<[f64; 2]>> = serde_json::from_str(text)?;
    let mut polylines = Vec::with_capacity(coords.len());
    for (index, stroke) in coords.into_iter().enumerate() {
        if stroke.len() < 2 {
            return Err(ExportError::DegenerateStroke {
                index,
                points: stroke.len(),
            });
        }
        polylines.push(Polyline::new(
            stroke.into_iter().map(|[x, y]| Point::new(x, y)).collect(),
        ));
    }
    Ok(StrokeSet::from_polylines(polylines))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn strokes(lines: &[&[(f64, f64)]]) -> StrokeSet {
        StrokeSet::from_polylines(
            lines
                .iter()
                .map(|l| Polyline::new(l.iter().map(|&(x, y)| Point::new(x, y)).collect()))
                .collect(),
        )
    }

    #[test]
    fn empty_set_is_an_empty_array() {
        assert_eq!(to_json(&StrokeSet::default()).unwrap(), "[]");
    }

    #[test]
    fn four_space_indentation() {
        let json = to_json(&strokes(&[&[(0.0, 4.0), (32.0, 4.0)]])).unwrap();
        let expected = "[\n    [\n        [\n            0.0,\n            4.0\n        ],\n        [\n            32.0,\n            4.0\n        ]\n    ]\n]";
        assert_eq!(json, expected);
    }

    #[test]
    fn round_trip_preserves_order_and_coordinates() {
        let set = strokes(&[
            &[(0.125, 3.5), (1e-3, 1234.75), (10.0 / 3.0, 0.1)],
            &[(8.0, 8.0), (0.0, 0.0)],
        ]);
        let back = from_json(&to_json(&set).unwrap()).unwrap();
        assert_eq!(back.len(), set.len());
        for (a, b) in back.strokes().iter().zip(set.strokes()) {
            assert_eq!(a.len(), b.len());
            for (p, q) in a.points().iter().zip(b.points()) {
                assert!((p.x - q.x).abs() <= f64::EPSILON * q.x.abs().max(1.0));
                assert!((p.y - q.y).abs() <= f64::EPSILON * q.y.abs().max(1.0));
            }
        }
    }

    #[test]
    fn single_point_stroke_rejected() {
        let err = from_json("[[[0, 0], [1, 1]], [[2, 2]]]").unwrap_err();
        assert!(matches!(
            err,
            ExportError::DegenerateStroke {
                index: 1,
                points: 1
            }
        ));
    }

    #[test]
    fn malformed_json_rejected() {
        assert!(matches!(from_json("[[1, 2, 3]]"), Err(ExportError::Json(_))));
        assert!(matches!(from_json("{}"), Err(ExportError::Json(_))));
    }
}
