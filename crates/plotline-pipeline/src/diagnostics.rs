//! Per-request diagnostics: timing and counts for each pass.
//!
//! Every call to [`vectorize`](crate::vectorize) collects diagnostics
//! alongside the strokes. Passes that are disabled by the parameters have
//! `None` entries.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::Dimensions;

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single vectorization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Size of the decoded source image.
    pub source: Dimensions,
    /// Contour pass, when enabled.
    pub contours: Option<StageDiagnostics>,
    /// Hatch pass, when enabled.
    pub hatching: Option<StageDiagnostics>,
    /// Wall-clock duration of the whole vectorization (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Strokes in the final tour.
    pub strokes: usize,
    /// Points across all strokes in the final tour.
    pub points: usize,
    /// Pen-up distance of the final tour, in output units.
    pub travel_distance: f64,
}

/// Diagnostics for one extraction pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Working resolution the pass ran at.
    pub working: Dimensions,
    /// Wall-clock duration of the pass, including its tour optimization
    /// (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Segments or contour fragments before merging.
    pub raw_polylines: usize,
    /// Polylines after merging and filtering.
    pub polylines: usize,
    /// Points across those polylines.
    pub points: usize,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Vectorization Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Source: {}x{}",
            self.source.width, self.source.height
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration)
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<12} {:>11} {:>10}  {}",
            "Pass", "Working", "Duration", "Details"
        ));
        lines.push("-".repeat(72));

        for (name, stage) in [("Contours", &self.contours), ("Hatching", &self.hatching)] {
            let Some(stage) = stage else {
                lines.push(format!("{name:<12} {:>11}", "disabled"));
                continue;
            };
            let working = format!("{}x{}", stage.working.width, stage.working.height);
            lines.push(format!(
                "{name:<12} {working:>11} {:>8.3}ms  {} raw -> {} polylines, {} pts",
                duration_ms(stage.duration),
                stage.raw_polylines,
                stage.polylines,
                stage.points,
            ));
        }

        lines.push(String::new());
        lines.push(format!(
            "Strokes: {}  |  Points: {}  |  Travel: {:.1}",
            self.strokes, self.points, self.travel_distance
        ));

        lines.join("\n")
    }
}

fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> PipelineDiagnostics {
        PipelineDiagnostics {
            source: Dimensions {
                width: 640,
                height: 480,
            },
            contours: None,
            hatching: Some(StageDiagnostics {
                working: Dimensions {
                    width: 40,
                    height: 30,
                },
                duration: Duration::from_millis(12),
                raw_polylines: 900,
                polylines: 60,
                points: 120,
            }),
            total_duration: Duration::from_millis(20),
            strokes: 60,
            points: 120,
            travel_distance: 1234.5,
        }
    }

    #[test]
    fn durations_serialize_as_seconds() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!((json["total_duration"].as_f64().unwrap() - 0.02).abs() < 1e-12);
        assert!(json["contours"].is_null());
    }

    #[test]
    fn serde_round_trip() {
        let diag = sample();
        let json = serde_json::to_string(&diag).unwrap();
        let back: PipelineDiagnostics = serde_json::from_str(&json).unwrap();
        assert_eq!(back.source, diag.source);
        assert_eq!(back.strokes, diag.strokes);
        let (a, b) = (back.hatching.unwrap(), diag.hatching.unwrap());
        assert_eq!((a.working, a.raw_polylines, a.polylines), (b.working, b.raw_polylines, b.polylines));
        assert!(a.duration.abs_diff(b.duration) < Duration::from_micros(1));
        assert!(back.total_duration.abs_diff(diag.total_duration) < Duration::from_micros(1));
    }

    #[test]
    fn negative_duration_rejected() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json["total_duration"] = serde_json::json!(-1.0);
        assert!(serde_json::from_value::<PipelineDiagnostics>(json).is_err());
    }

    #[test]
    fn report_mentions_each_pass() {
        let report = sample().report();
        assert!(report.contains("Source: 640x480"));
        assert!(report.contains("disabled"));
        assert!(report.contains("40x30"));
        assert!(report.contains("900 raw -> 60 polylines"));
        assert!(report.contains("Strokes: 60"));
    }
}
