//! plotline-pipeline: Pure raster-to-stroke vectorization (sans-IO).
//!
//! Converts an intensity image into an ordered set of pen strokes through
//! two independent passes:
//!
//! - contours: autocontrast -> resize -> edge mask -> contour tracing ->
//!   tour optimization
//! - hatching: autocontrast -> resize -> density hatching -> tour
//!   optimization
//!
//! The contour tour (drawn `1 + contour_repeat` times) is followed by the
//! hatch tour.
//!
//! This crate has **no I/O dependencies**: it operates on in-memory byte
//! slices and images and returns structured data. Path resolution and file
//! writing live in `plotline-io`.

pub mod blur;
pub mod canny;
pub mod contour;
pub mod contrast;
pub mod diagnostics;
pub mod downsample;
pub mod edge;
pub mod grayscale;
pub mod hatch;
pub mod optimize;
pub mod types;

use std::thread;
use std::time::Instant;

pub use diagnostics::{PipelineDiagnostics, StageDiagnostics};
pub use downsample::ResizeFilter;
pub use edge::{EdgeBackend, EdgeDetector};
pub use types::{
    Dimensions, GrayImage, Parameters, PipelineConfig, PipelineError, Point, Polyline, StrokeSet,
    Traced,
};

/// Strokes produced by a vectorization, with diagnostics.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// The final tour, in drawing order.
    pub strokes: StrokeSet,
    /// Timing and counts for each pass.
    pub diagnostics: PipelineDiagnostics,
}

/// Decode image bytes and vectorize them.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty,
/// [`PipelineError::ImageDecode`] if the format is unrecognized, and any
/// error from [`vectorize`].
pub fn process(
    image_bytes: &[u8],
    params: Parameters,
    config: &PipelineConfig,
) -> Result<ProcessResult, PipelineError> {
    let gray = grayscale::decode_luma(image_bytes)?;
    vectorize(&gray, params, config)
}

/// Vectorize an intensity image.
///
/// Both working sizes are checked before any pixel work starts. An image
/// with no edges and no dark cells yields an empty [`StrokeSet`], which is
/// a success.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidParameters`] if both passes are
/// disabled, a parameter is negative or not finite, a pass would work at a
/// zero-sized or oversized resolution, or the autocontrast cutoff is out
/// of range.
pub fn vectorize(
    source: &GrayImage,
    params: Parameters,
    config: &PipelineConfig,
) -> Result<ProcessResult, PipelineError> {
    let start = Instant::now();
    params.validate()?;

    let source_dims = Dimensions::of(source);
    let resolution = config.resolution.unwrap_or(source_dims.width);
    let contour_size = params
        .contours_enabled()
        .then(|| downsample::working_size(source_dims, resolution, params.contour_divisor))
        .transpose()?;
    let hatch_size = params
        .hatching_enabled()
        .then(|| downsample::working_size(source_dims, resolution, params.hatch_cell))
        .transpose()?;

    let adjusted = contrast::autocontrast(source, config.autocontrast_cutoff)?;

    let contour_pass = || {
        contour_size.map(|size| {
            run_pass(&adjusted, size, config.resize_filter, |working| {
                let mask = config.edge_backend.detect(working);
                log::debug!(
                    "{:?} edge mask has {} edge pixels",
                    config.edge_backend,
                    edge::edge_pixel_count(&mask)
                );
                contour::trace_contours(&mask, params.contour_divisor)
            })
        })
    };
    let hatch_pass = || {
        hatch_size.map(|size| {
            run_pass(&adjusted, size, config.resize_filter, |working| {
                hatch::hatch(working, params.hatch_cell)
            })
        })
    };

    let (contours, hatching) = if config.parallel && contour_size.is_some() && hatch_size.is_some()
    {
        thread::scope(|s| {
            let worker = s.spawn(contour_pass);
            let hatching = hatch_pass();
            let contours = worker
                .join()
                .unwrap_or_else(|payload| std::panic::resume_unwind(payload));
            (contours, hatching)
        })
    } else {
        (contour_pass(), hatch_pass())
    };

    let mut tour = Vec::new();
    if let Some((contour_tour, _)) = &contours {
        for _ in 0..=params.contour_repeat {
            tour.extend(contour_tour.iter().cloned());
        }
    }
    if let Some((hatch_tour, _)) = &hatching {
        tour.extend(hatch_tour.iter().cloned());
    }
    let strokes = StrokeSet::from_polylines(tour);

    let diagnostics = PipelineDiagnostics {
        source: source_dims,
        contours: contours.map(|(_, diag)| diag),
        hatching: hatching.map(|(_, diag)| diag),
        total_duration: start.elapsed(),
        strokes: strokes.len(),
        points: strokes.point_count(),
        travel_distance: strokes.travel_distance(),
    };
    log::info!(
        "vectorized {}x{} image into {} strokes, {} points",
        source_dims.width,
        source_dims.height,
        diagnostics.strokes,
        diagnostics.points,
    );

    Ok(ProcessResult {
        strokes,
        diagnostics,
    })
}

/// Resize a private copy of `image`, extract polylines from it, and order
/// them into a tour.
fn run_pass(
    image: &GrayImage,
    size: Dimensions,
    filter: ResizeFilter,
    extract: impl FnOnce(&GrayImage) -> Traced,
) -> (Vec<Polyline>, StageDiagnostics) {
    let start = Instant::now();
    let working = downsample::resize(image, size, filter);
    let traced = extract(&working);
    let tour = optimize::optimize_path_order(traced.polylines);

    let diagnostics = StageDiagnostics {
        working: size,
        duration: start.elapsed(),
        raw_polylines: traced.raw,
        polylines: tour.len(),
        points: tour.iter().map(Polyline::len).sum(),
    };
    (tour, diagnostics)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::Luma;

    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn uniform(width: u32, height: u32, level: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([level]))
    }

    /// Left half black, right half white: one strong vertical edge.
    fn sharp_edge(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            Luma([if x < width / 2 { 0 } else { 255 }])
        })
    }

    const fn params(contour_divisor: f64, hatch_cell: f64, contour_repeat: u32) -> Parameters {
        Parameters {
            contour_divisor,
            hatch_cell,
            contour_repeat,
        }
    }

    fn png(image: &GrayImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::L8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn both_passes_disabled_is_invalid() {
        let result = vectorize(&uniform(32, 32, 128), params(0.0, 0.0, 0), &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::InvalidParameters(_))));
    }

    #[test]
    fn negative_parameter_is_invalid() {
        let result = vectorize(&uniform(32, 32, 128), params(-1.0, 16.0, 0), &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::InvalidParameters(_))));
    }

    #[test]
    fn divisor_that_empties_the_working_image_is_invalid() {
        let result = vectorize(&uniform(32, 32, 128), params(64.0, 0.0, 0), &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::InvalidParameters(_))));
    }

    #[test]
    fn all_white_image_succeeds_with_no_strokes() {
        init_logger();
        for divisor in [1.0, 2.0, 4.0] {
            let result =
                vectorize(&uniform(64, 48, 255), params(divisor, 0.0, 0), &PipelineConfig::default())
                    .unwrap();
            assert!(result.strokes.is_empty());
            assert_eq!(result.diagnostics.contours.unwrap().polylines, 0);
        }
    }

    #[test]
    fn mid_grey_hatches_a_two_by_two_grid() {
        init_logger();
        let result =
            vectorize(&uniform(32, 32, 128), params(0.0, 16.0, 0), &PipelineConfig::default())
                .unwrap();

        assert!(result.diagnostics.contours.is_none());
        let hatching = result.diagnostics.hatching.unwrap();
        assert_eq!(hatching.working, Dimensions { width: 2, height: 2 });
        assert_eq!(hatching.raw_polylines, 4, "one horizontal per cell");

        // Two merged row runs, no diagonals.
        assert_eq!(result.strokes.len(), 2);
        for stroke in result.strokes.strokes() {
            let (a, b) = (stroke.first().unwrap(), stroke.last().unwrap());
            assert!((a.y - b.y).abs() < f64::EPSILON);
            assert!(((a.x - b.x).abs() - 32.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn sharp_edge_produces_contours() {
        let result =
            vectorize(&sharp_edge(64, 64), params(1.0, 0.0, 0), &PipelineConfig::default())
                .unwrap();
        assert!(!result.strokes.is_empty());
        assert!(result.strokes.strokes().iter().all(|s| s.len() >= 2));
    }

    #[test]
    fn sobel_backend_also_finds_the_edge() {
        let config = PipelineConfig {
            edge_backend: EdgeBackend::Sobel,
            ..PipelineConfig::default()
        };
        let result = vectorize(&sharp_edge(64, 64), params(1.0, 0.0, 0), &config).unwrap();
        assert!(!result.strokes.is_empty());
    }

    #[test]
    fn contour_repeat_draws_the_tour_again() {
        let once = vectorize(&sharp_edge(64, 64), params(1.0, 0.0, 0), &PipelineConfig::default())
            .unwrap()
            .strokes
            .into_strokes();
        let thrice =
            vectorize(&sharp_edge(64, 64), params(1.0, 0.0, 2), &PipelineConfig::default())
                .unwrap()
                .strokes
                .into_strokes();

        assert_eq!(thrice.len(), once.len() * 3);
        for chunk in thrice.chunks(once.len()) {
            assert_eq!(chunk, once.as_slice());
        }
    }

    #[test]
    fn contours_come_before_hatching() {
        let img = sharp_edge(64, 64);
        let contours_only = vectorize(&img, params(1.0, 0.0, 0), &PipelineConfig::default())
            .unwrap()
            .strokes
            .into_strokes();
        let hatch_only = vectorize(&img, params(0.0, 8.0, 0), &PipelineConfig::default())
            .unwrap()
            .strokes
            .into_strokes();
        let both = vectorize(&img, params(1.0, 8.0, 0), &PipelineConfig::default())
            .unwrap()
            .strokes
            .into_strokes();

        assert_eq!(both.len(), contours_only.len() + hatch_only.len());
        assert_eq!(&both[..contours_only.len()], contours_only.as_slice());
        assert_eq!(&both[contours_only.len()..], hatch_only.as_slice());
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let img = GrayImage::from_fn(80, 60, |x, y| Luma([((x * 3 + y * 2) % 256) as u8]));
        let p = params(2.0, 4.0, 1);
        let parallel = vectorize(&img, p, &PipelineConfig::default()).unwrap();
        let sequential = vectorize(
            &img,
            p,
            &PipelineConfig {
                parallel: false,
                ..PipelineConfig::default()
            },
        )
        .unwrap();
        assert_eq!(parallel.strokes, sequential.strokes);
    }

    #[test]
    fn resolution_sets_working_width() {
        let config = PipelineConfig {
            resolution: Some(128),
            ..PipelineConfig::default()
        };
        let result = vectorize(&uniform(32, 16, 100), params(0.0, 8.0, 0), &config).unwrap();
        assert_eq!(
            result.diagnostics.hatching.unwrap().working,
            Dimensions { width: 16, height: 8 }
        );
    }

    #[test]
    fn diagnostics_summarize_the_tour() {
        let result =
            vectorize(&sharp_edge(64, 64), params(1.0, 8.0, 0), &PipelineConfig::default())
                .unwrap();
        let diag = &result.diagnostics;
        assert_eq!(diag.source, Dimensions { width: 64, height: 64 });
        assert_eq!(diag.strokes, result.strokes.len());
        assert_eq!(diag.points, result.strokes.point_count());
        assert!((diag.travel_distance - result.strokes.travel_distance()).abs() < f64::EPSILON);
    }

    #[test]
    fn process_decodes_then_vectorizes() {
        let bytes = png(&uniform(32, 32, 128));
        let result = process(&bytes, params(0.0, 16.0, 0), &PipelineConfig::default()).unwrap();
        assert_eq!(result.strokes.len(), 2);
    }

    #[test]
    fn process_empty_input() {
        let result = process(&[], Parameters::default(), &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn process_corrupt_input() {
        let result = process(&[0xFF, 0x00], Parameters::default(), &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }
}
