//! plotline: convert a raster image into pen-plotter strokes.
//!
//! Writes `<stem>.json` (the stroke list for the plotter controller) and
//! `<stem>.svg` (a half-scale preview) into the output directory, then
//! prints a diagnostics report.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin plotline -- [OPTIONS] <IMAGE>
//! ```
//!
//! Exit status is 0 on success, 2 when the image cannot be found or the
//! parameters are unusable, and 1 for any other failure.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use plotline_io::{ConvertConfig, ConvertError};
use plotline_pipeline::{EdgeBackend, Parameters, PipelineConfig, ResizeFilter};

/// Convert an image into an ordered set of pen strokes.
#[derive(Parser)]
#[command(name = "plotline", version)]
struct Cli {
    /// Image path, or a bare name looked up in the image directory with
    /// the usual raster extensions.
    image: String,

    /// Contour density divisor; 0 disables contours.
    #[arg(long, default_value_t = Parameters::DEFAULT_CONTOUR_DIVISOR)]
    contour_divisor: f64,

    /// Hatch cell size; 0 disables hatching.
    #[arg(long, default_value_t = Parameters::DEFAULT_HATCH_CELL)]
    hatch_cell: f64,

    /// Extra passes over the contour tour.
    #[arg(long, default_value_t = Parameters::DEFAULT_CONTOUR_REPEAT)]
    contour_repeat: u32,

    /// Directory searched for bare image names.
    #[arg(long, default_value = plotline_io::DEFAULT_IMAGE_DIR)]
    image_dir: PathBuf,

    /// Directory receiving the JSON and SVG outputs.
    #[arg(long, default_value = plotline_io::DEFAULT_IMAGE_DIR)]
    output_dir: PathBuf,

    /// Working-resolution numerator in pixels (defaults to the source
    /// width).
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    resolution: Option<u32>,

    /// Percentage of the histogram clipped from each end by autocontrast.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_AUTOCONTRAST_CUTOFF)]
    autocontrast_cutoff: f64,

    /// Edge detector for the contour pass.
    #[arg(long, value_enum, default_value_t = Backend::Canny)]
    edge_backend: Backend,

    /// Resampling filter (nearest, triangle, catmull-rom, gaussian,
    /// lanczos3).
    #[arg(long, value_enum, default_value_t = CLI_DEFAULT_FILTER)]
    resize_filter: Filter,

    /// Run the contour and hatch passes one after the other.
    #[arg(long)]
    sequential: bool,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, the pipeline flags above (resolution, autocontrast,
    /// backend, filter, sequential) are ignored. The JSON must be a valid
    /// `PipelineConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Print diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,
}

/// Edge detector selection.
#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    /// Gaussian blur, then Canny with hysteresis.
    Canny,
    /// Sobel gradient magnitude, thresholded directly.
    Sobel,
}

/// Resampling filter selection.
#[derive(Clone, Copy, ValueEnum)]
enum Filter {
    /// Nearest-neighbor (fastest, blocky).
    Nearest,
    /// Bilinear interpolation.
    Triangle,
    /// Bicubic Catmull-Rom.
    CatmullRom,
    /// Gaussian.
    Gaussian,
    /// Lanczos with 3 lobes (slowest, sharpest).
    Lanczos3,
}

const fn filter_from_pipeline(f: ResizeFilter) -> Filter {
    match f {
        ResizeFilter::Nearest => Filter::Nearest,
        ResizeFilter::Triangle => Filter::Triangle,
        ResizeFilter::CatmullRom => Filter::CatmullRom,
        ResizeFilter::Gaussian => Filter::Gaussian,
        ResizeFilter::Lanczos3 => Filter::Lanczos3,
    }
}

/// Derived from [`PipelineConfig::DEFAULT_RESIZE_FILTER`] so the two
/// cannot silently diverge.
const CLI_DEFAULT_FILTER: Filter = filter_from_pipeline(PipelineConfig::DEFAULT_RESIZE_FILTER);

/// Build the conversion config from CLI arguments.
///
/// `--config-json` replaces every individual pipeline flag.
fn config_from_cli(cli: &Cli) -> Result<ConvertConfig, String> {
    let pipeline = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        PipelineConfig {
            resolution: cli.resolution,
            autocontrast_cutoff: cli.autocontrast_cutoff,
            edge_backend: match cli.edge_backend {
                Backend::Canny => EdgeBackend::Canny,
                Backend::Sobel => EdgeBackend::Sobel,
            },
            resize_filter: match cli.resize_filter {
                Filter::Nearest => ResizeFilter::Nearest,
                Filter::Triangle => ResizeFilter::Triangle,
                Filter::CatmullRom => ResizeFilter::CatmullRom,
                Filter::Gaussian => ResizeFilter::Gaussian,
                Filter::Lanczos3 => ResizeFilter::Lanczos3,
            },
            parallel: !cli.sequential,
        }
    };

    Ok(ConvertConfig {
        image_dir: cli.image_dir.clone(),
        output_dir: cli.output_dir.clone(),
        pipeline,
    })
}

fn params_from_cli(cli: &Cli) -> Parameters {
    Parameters {
        contour_divisor: cli.contour_divisor,
        hatch_cell: cli.hatch_cell,
        contour_repeat: cli.contour_repeat,
    }
}

/// Exit status for a failed conversion.
const fn exit_status(err: &ConvertError) -> u8 {
    if err.is_actionable() { 2 } else { 1 }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    let params = params_from_cli(&cli);
    log::debug!("parameters: {params:?}, config: {config:?}");

    let outcome = match plotline_io::convert(&cli.image, params, &config) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(exit_status(&e));
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&outcome.diagnostics) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing diagnostics: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", outcome.diagnostics.report());
        println!();
        println!("Source:  {}", outcome.source.display());
        println!("Strokes: {}", outcome.outputs.json.display());
        println!("Preview: {}", outcome.outputs.svg.display());
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("plotline").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_match_library_defaults() {
        let cli = parse(&["cat"]);
        assert_eq!(params_from_cli(&cli), Parameters::default());
        assert_eq!(config_from_cli(&cli).unwrap(), ConvertConfig::default());
    }

    #[test]
    fn flags_build_pipeline_config() {
        let cli = parse(&[
            "cat",
            "--resolution",
            "512",
            "--edge-backend",
            "sobel",
            "--resize-filter",
            "lanczos3",
            "--sequential",
            "--hatch-cell",
            "0",
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.pipeline.resolution, Some(512));
        assert_eq!(config.pipeline.edge_backend, EdgeBackend::Sobel);
        assert_eq!(config.pipeline.resize_filter, ResizeFilter::Lanczos3);
        assert!(!config.pipeline.parallel);
        assert!(!params_from_cli(&cli).hatching_enabled());
    }

    #[test]
    fn config_json_overrides_flags() {
        let cli = parse(&[
            "cat",
            "--edge-backend",
            "sobel",
            "--config-json",
            r#"{"resolution": 256}"#,
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.pipeline.resolution, Some(256));
        assert_eq!(config.pipeline.edge_backend, EdgeBackend::Canny);
    }

    #[test]
    fn bad_config_json_is_reported() {
        let cli = parse(&["cat", "--config-json", "{"]);
        assert!(config_from_cli(&cli).unwrap_err().contains("--config-json"));
    }

    #[test]
    fn zero_resolution_rejected() {
        assert!(Cli::try_parse_from(["plotline", "cat", "--resolution", "0"]).is_err());
    }

    #[test]
    fn actionable_errors_exit_with_two() {
        let err = ConvertError::InvalidParameters("both disabled".to_owned());
        assert_eq!(exit_status(&err), 2);
        let err = ConvertError::Io {
            path: PathBuf::from("out.json"),
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(exit_status(&err), 1);
    }
}
