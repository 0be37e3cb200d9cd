use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Comparison strictness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    /// Shape-driven: curve profile dominates, exact skeleton overlap.
    Strict,
    /// Layout-driven: grid density dominates, 1px-tolerant overlap.
    #[default]
    Lenient,
    /// Lenient weights with a 2px overlap tolerance and a ×2 boost.
    SuperLenient,
}

/// Metric weights and post-processing for one [`ComparisonMode`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeWeights {
    pub curve: f64,
    pub iou: f64,
    pub grid: f64,
    /// Chebyshev radius applied to both skeletons before IoU.
    pub iou_dilation: usize,
    /// Multiplier applied to the weighted sum before clamping to `[0, 100]`.
    pub boost: f64,
}

impl ComparisonMode {
    pub const ALL: [ComparisonMode; 3] = [
        ComparisonMode::Strict,
        ComparisonMode::Lenient,
        ComparisonMode::SuperLenient,
    ];

    pub fn weights(self) -> ModeWeights {
        match self {
            ComparisonMode::Strict => ModeWeights {
                curve: 0.60,
                iou: 0.30,
                grid: 0.10,
                iou_dilation: 0,
                boost: 1.05,
            },
            ComparisonMode::Lenient => ModeWeights {
                curve: 0.20,
                iou: 0.30,
                grid: 0.50,
                iou_dilation: 1,
                boost: 1.40,
            },
            ComparisonMode::SuperLenient => ModeWeights {
                curve: 0.20,
                iou: 0.30,
                grid: 0.50,
                iou_dilation: 2,
                boost: 2.00,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonMode::Strict => "strict",
            ComparisonMode::Lenient => "lenient",
            ComparisonMode::SuperLenient => "super_lenient",
        }
    }
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown comparison mode `{0}` (expected strict, lenient or super_lenient)")]
pub struct ParseModeError(pub String);

impl FromStr for ComparisonMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "strict" => Ok(ComparisonMode::Strict),
            "lenient" => Ok(ComparisonMode::Lenient),
            "super_lenient" => Ok(ComparisonMode::SuperLenient),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}
