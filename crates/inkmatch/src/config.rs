//! JSON configuration and report helpers.

use std::fs;
use std::path::Path;

use inkmatch_anchor::{AnchorParams, AnchorResolution};
use inkmatch_core::PixelRect;
use inkmatch_region::{RegionDetection, RegionParams, RegionStrategy};
use inkmatch_score::{
    ComparatorParams, ComparisonMode, ComparisonResult, ComparisonStatus, MetricScores,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Read any JSON document from disk.
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, IoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Write `value` to disk as pretty JSON.
pub fn write_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Every tunable of the pipeline in one file. Missing sections keep their
/// defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InkmatchConfig {
    pub mode: ComparisonMode,
    pub comparator: ComparatorParams,
    pub region: RegionParams,
    pub anchor: AnchorParams,
}

impl InkmatchConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        load_json(path)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        write_json(self, path)
    }
}

/// Summary of a pairwise comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompareReport {
    pub first: String,
    pub second: String,
    pub mode: ComparisonMode,
    pub score: f64,
    /// False when at least one input had no usable signature.
    pub determined: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricScores>,
    /// Contrast constants that produced each stroke mask.
    #[serde(default)]
    pub contrast: [Option<f32>; 2],
}

impl CompareReport {
    pub fn new(
        first: impl Into<String>,
        second: impl Into<String>,
        result: &ComparisonResult,
    ) -> Self {
        let reason = match &result.status {
            ComparisonStatus::Compared => None,
            ComparisonStatus::Undetermined(err) => Some(err.to_string()),
        };
        Self {
            first: first.into(),
            second: second.into(),
            mode: result.mode,
            score: result.score,
            determined: result.is_determined(),
            reason,
            metrics: result.metrics,
            contrast: [
                result.first.as_ref().map(|p| p.stroke.contrast),
                result.second.as_ref().map(|p| p.stroke.contrast),
            ],
        }
    }
}

/// Outcome of a region detection run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionReport {
    pub image: String,
    pub strategy: RegionStrategy,
    pub rect: PixelRect,
    pub fallback: bool,
}

impl RegionReport {
    pub fn new(image: impl Into<String>, detection: &RegionDetection) -> Self {
        Self {
            image: image.into(),
            strategy: detection.strategy,
            rect: detection.rect,
            fallback: detection.fallback,
        }
    }
}

/// Outcome of resolving a visual anchor on a page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnchorReport {
    pub image: String,
    #[serde(flatten)]
    pub resolution: AnchorResolution,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("inkmatch.json");
        let mut cfg = InkmatchConfig {
            mode: ComparisonMode::Strict,
            ..InkmatchConfig::default()
        };
        cfg.comparator.grid.cols = 12;
        cfg.write_json(&path).expect("write");
        assert_eq!(InkmatchConfig::load_json(&path).expect("load"), cfg);
    }

    #[test]
    fn sparse_config_keeps_defaults() {
        let json = r#"{ "mode": "super_lenient", "anchor": { "accept_score": 0.7 } }"#;
        let cfg: InkmatchConfig = serde_json::from_str(json).expect("parse");
        assert_eq!(cfg.mode, ComparisonMode::SuperLenient);
        assert_eq!(cfg.anchor.accept_score, 0.7);
        assert_eq!(cfg.anchor.fractional_confidence, 0.6);
        assert_eq!(cfg.region, RegionParams::default());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = InkmatchConfig::load_json("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }
}
