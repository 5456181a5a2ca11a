//! SVG preview serializer.
//!
//! Every stroke becomes one `<polyline>` element drawn at half scale with a
//! black one-unit stroke and no fill. The root element declares pixel
//! `width` and `height` equal to the ceiling of half the largest `x` and
//! `y` coordinates across all strokes.
//!
//! Optional [`SvgMetadata`] embeds `<title>` and `<desc>` elements so file
//! managers can identify previews.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use std::fmt::Write;

use svg::Document;
use svg::node::element::{Description, Polyline as SvgPolyline, Title};
use svg::node::Text;

use plotline_pipeline::{Polyline, StrokeSet};

/// Factor applied to stroke coordinates in the preview.
pub const PREVIEW_SCALE: f64 = 0.5;

/// Metadata to embed in the SVG document.
///
/// Text values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`. Typically the source image
    /// stem.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,
}

/// Build the `points` attribute value for one stroke at preview scale.
///
/// # Examples
///
/// ```
/// use plotline_pipeline::{Point, Polyline};
/// use plotline_export::svg::polyline_points;
///
/// let stroke = Polyline::new(vec![Point::new(10.0, 20.0), Point::new(31.0, 40.0)]);
/// assert_eq!(polyline_points(&stroke), "5,10 15.5,20");
/// ```
#[must_use]
pub fn polyline_points(polyline: &Polyline) -> String {
    let mut out = String::new();
    for (i, p) in polyline.points().iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        // Writing to a String cannot fail.
        let _ = write!(out, "{},{}", p.x * PREVIEW_SCALE, p.y * PREVIEW_SCALE);
    }
    out
}

/// Canvas size in pixels for `strokes` at preview scale.
///
/// Returns `(0, 0)` for an empty stroke set.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn canvas_size(strokes: &StrokeSet) -> (u32, u32) {
    let (max_x, max_y) = strokes.max_extent();
    let side = |v: f64| (v * PREVIEW_SCALE).ceil().max(0.0) as u32;
    (side(max_x), side(max_y))
}

/// Render `strokes` as an SVG document.
///
/// Strokes appear in tour order; nothing is reordered or dropped.
#[must_use]
pub fn to_svg(strokes: &StrokeSet, metadata: &SvgMetadata<'_>) -> String {
    let (width, height) = canvas_size(strokes);
    let mut doc = Document::new()
        .set("version", "1.1")
        .set("width", format!("{width}px"))
        .set("height", format!("{height}px"));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    for stroke in strokes.strokes() {
        doc = doc.add(
            SvgPolyline::new()
                .set("points", polyline_points(stroke))
                .set("stroke", "black")
                .set("stroke-width", 1)
                .set("fill", "none"),
        );
    }

    doc.to_string()
}

#[cfg(test)]
mod tests {
    use plotline_pipeline::Point;

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
    fn canvas_is_ceiling_of_half_extent() {
        let set = strokes(&[&[(0.0, 0.0), (31.0, 10.0)], &[(2.0, 45.0), (3.0, 3.0)]]);
        assert_eq!(canvas_size(&set), (16, 23));
    }

    #[test]
    fn empty_stroke_set_has_zero_canvas() {
        let svg = to_svg(&StrokeSet::default(), &SvgMetadata::default());
        assert!(svg.contains(r#"width="0px""#));
        assert!(svg.contains(r#"height="0px""#));
        assert!(!svg.contains("<polyline"));
    }

    #[test]
    fn one_polyline_per_stroke_with_fixed_style() {
        let set = strokes(&[&[(0.0, 4.0), (32.0, 4.0)], &[(0.0, 20.0), (32.0, 20.0)]]);
        let svg = to_svg(&set, &SvgMetadata::default());

        assert!(svg.contains("<svg"));
        assert!(svg.contains(r#"width="16px""#));
        assert!(svg.contains(r#"height="10px""#));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert_eq!(svg.matches(r#"stroke="black""#).count(), 2);
        assert_eq!(svg.matches(r#"stroke-width="1""#).count(), 2);
        assert_eq!(svg.matches(r#"fill="none""#).count(), 2);
        assert!(svg.contains(r#"points="0,2 16,2""#));
        assert!(svg.contains(r#"points="0,10 16,10""#));
    }

    #[test]
    fn strokes_keep_tour_order() {
        let set = strokes(&[&[(8.0, 8.0), (10.0, 8.0)], &[(0.0, 0.0), (2.0, 0.0)]]);
        let svg = to_svg(&set, &SvgMetadata::default());
        let first = svg.find(r#"points="4,4"#).unwrap_or(usize::MAX);
        let second = svg.find(r#"points="0,0"#).unwrap_or(usize::MAX);
        assert!(first < second);
    }

    #[test]
    fn metadata_is_embedded_and_escaped() {
        let metadata = SvgMetadata {
            title: Some("portrait"),
            description: Some("contours <2> & hatching"),
        };
        let svg = to_svg(&StrokeSet::default(), &metadata);
        assert!(svg.contains("<title>portrait</title>"));
        assert!(svg.contains("&lt;2"));
        assert!(svg.contains("&amp; hatching"));
    }
}
