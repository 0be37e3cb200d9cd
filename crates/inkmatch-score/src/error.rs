use std::fmt;

use inkmatch_stroke::ExtractError;
use serde::{Deserialize, Serialize};

/// Which input of a pairwise comparison an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    First,
    Second,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::First => "first",
            Side::Second => "second",
        })
    }
}

/// Why a comparison could not be carried out.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CompareError {
    #[error("{side} image: {source}")]
    Extraction {
        side: Side,
        #[source]
        source: ExtractError,
    },

    #[error("{side} image: normalization found no content")]
    EmptyNormalization { side: Side },

    #[error("canvas shapes differ ({a_width}x{a_height} vs {b_width}x{b_height})")]
    CanvasMismatch {
        a_width: usize,
        a_height: usize,
        b_width: usize,
        b_height: usize,
    },
}

impl CompareError {
    /// The input responsible, if the failure is one-sided.
    pub fn side(&self) -> Option<Side> {
        match self {
            CompareError::Extraction { side, .. } | CompareError::EmptyNormalization { side } => {
                Some(*side)
            }
            CompareError::CanvasMismatch { .. } => None,
        }
    }
}
