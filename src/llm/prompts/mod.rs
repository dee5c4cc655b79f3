// ABOUTME: Prompts for the medical analyst and label OCR loaded at compile time
// ABOUTME: Markdown sources live next to this module for easy review
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Prompts
//!
//! Prompts are loaded at compile time from markdown files.

/// System prompt for the medical nutrition analyst
///
/// Asks for a single JSON object with the keys understood by
/// `MedicalInsight` plus an optional `nutrition_estimate`.
pub const MEDICAL_ANALYST_PROMPT: &str = include_str!("medical_analyst.md");

/// Instruction for transcribing a label photo
pub const LABEL_OCR_PROMPT: &str = include_str!("label_ocr.md");

/// Instruction for reading the digits under a barcode
pub const BARCODE_READ_PROMPT: &str = include_str!("barcode_read.md");
