// ABOUTME: Provenance tags for nutrition data and the single precedence table
// ABOUTME: SourceKind distinguishes barcode database, OCR, manual entry and LLM output
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a piece of product data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// Structured product database looked up by barcode or name
    #[serde(rename = "barcode-db")]
    BarcodeDatabase,
    /// Text recognized from a label photo
    #[serde(rename = "ocr")]
    Ocr,
    /// Values supplied directly by the caller
    #[serde(rename = "manual")]
    Manual,
    /// Best-effort estimate from a language model
    #[serde(rename = "llm")]
    Llm,
}

impl SourceKind {
    /// All sources from most to least trusted
    pub const PRECEDENCE_ORDER: [Self; 4] =
        [Self::Manual, Self::BarcodeDatabase, Self::Ocr, Self::Llm];

    /// Rank used to break ties between equally confident values (higher wins)
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Manual => 4,
            Self::BarcodeDatabase => 3,
            Self::Ocr => 2,
            Self::Llm => 1,
        }
    }

    /// Advisory sources only fill gaps and never override measured data
    #[must_use]
    pub const fn is_advisory(self) -> bool {
        matches!(self, Self::Llm)
    }

    /// Wire identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BarcodeDatabase => "barcode-db",
            Self::Ocr => "ocr",
            Self::Manual => "manual",
            Self::Llm => "llm",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
