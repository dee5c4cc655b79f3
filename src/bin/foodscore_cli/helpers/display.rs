// ABOUTME: Output formatting helpers for foodscore-cli
// ABOUTME: Prints analysis reports as pretty JSON or a short terminal summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use foodscore::errors::AppResult;
use foodscore::pipeline::AnalysisReport;
use serde::Serialize;

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a report as JSON, or as a summary when requested
pub fn print_report(report: &AnalysisReport, summary: bool) -> AppResult<()> {
    if !summary {
        return print_json(report);
    }

    let name = report.product_name.as_deref().unwrap_or("Unknown product");
    println!("\n{name}");
    if let Some(brand) = &report.brand {
        println!("   Brand: {brand}");
    }
    if let Some(barcode) = &report.barcode {
        println!("   Barcode: {barcode}");
    }
    println!("{}", "=".repeat(60));
    println!("Health score: {}/100 ({})", report.score, report.band);

    println!("\nWhy:");
    for explanation in &report.explanations {
        println!("  • {explanation}");
    }

    if !report.recommendations.is_empty() {
        println!("\nRecommendations:");
        for recommendation in &report.recommendations {
            println!("  • {recommendation}");
        }
    }

    if !report.unverified.is_empty() {
        let names: Vec<&str> = report.unverified.iter().map(|n| n.as_str()).collect();
        println!("\nUnverified: {}", names.join(", "));
    }

    if !report.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &report.warnings {
            println!("  ! {warning}");
        }
    }
    Ok(())
}
