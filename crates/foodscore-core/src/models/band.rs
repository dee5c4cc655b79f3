// ABOUTME: Health band classification of a 0-100 score
// ABOUTME: Fixed cutpoints with inclusive lower bounds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::guidelines::{BAND_EXCELLENT_MIN, BAND_GOOD_MIN, BAND_MODERATE_MIN};

/// Coarse classification of a health score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HealthBand {
    /// Below 40
    Poor,
    /// 40 to 59
    Moderate,
    /// 60 to 79
    Good,
    /// 80 and above
    Excellent,
}

impl HealthBand {
    /// Band for a score in `[0, 100]`
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        if score >= BAND_EXCELLENT_MIN {
            Self::Excellent
        } else if score >= BAND_GOOD_MIN {
            Self::Good
        } else if score >= BAND_MODERATE_MIN {
            Self::Moderate
        } else {
            Self::Poor
        }
    }

    /// Display name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Poor => "Poor",
            Self::Moderate => "Moderate",
            Self::Good => "Good",
            Self::Excellent => "Excellent",
        }
    }
}

impl fmt::Display for HealthBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
