// ABOUTME: FoodScore CLI - score label text, manual nutrition files and barcodes from the terminal
// ABOUTME: Shares the analysis pipeline with the HTTP server and prints reports as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Score OCR text of a nutrition label
//! foodscore-cli score-text label.txt
//!
//! # Score a manual nutrition document
//! foodscore-cli score-json nutrition.json
//!
//! # Look up a barcode in the demo catalogue
//! foodscore-cli lookup 5449000000996 --demo
//!
//! # Print the effective scoring configuration
//! foodscore-cli rules
//! ```

mod commands;
mod helpers;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use foodscore::logging::LoggingConfig;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "foodscore-cli",
    about = "FoodScore nutrition scoring CLI",
    long_about = "Score nutrition labels, manual nutrition documents and barcodes with the FoodScore engine."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print a short human-readable summary instead of JSON
    #[arg(long, global = true)]
    summary: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Parse label text (e.g. OCR output), normalize and score it
    ScoreText {
        /// File containing the label text
        file: PathBuf,
    },

    /// Score a manual nutrition JSON document
    ScoreJson {
        /// File containing `{"nutrition": {...}, "ingredients": [...], ...}`
        file: PathBuf,
    },

    /// Look up a barcode and score the product
    Lookup {
        /// EAN-8, UPC-A, EAN-13 or GTIN-14 barcode
        barcode: String,

        /// Use the built-in demo catalogue instead of OpenFoodFacts
        #[arg(long)]
        demo: bool,
    },

    /// Print the effective scoring configuration and rule catalogue
    Rules,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    LoggingConfig::for_cli(cli.verbose).init()?;
    debug!("FoodScore CLI");

    match cli.command {
        Command::ScoreText { file } => commands::score::score_text(&file, cli.summary).await?,
        Command::ScoreJson { file } => commands::score::score_json(&file, cli.summary).await?,
        Command::Lookup { barcode, demo } => {
            commands::lookup::lookup(&barcode, demo, cli.summary).await?;
        }
        Command::Rules => commands::score::rules()?,
    }

    Ok(())
}
