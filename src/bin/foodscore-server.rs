// ABOUTME: FoodScore HTTP server binary
// ABOUTME: Loads environment configuration, initializes logging and serves the analysis API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # `FoodScore` API Server Binary
//!
//! Starts the HTTP API for label image analysis, barcode and name lookup,
//! manual scoring and analysis history.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use foodscore::config::ServerConfig;
use foodscore::logging;
use foodscore::server::{self, ServerResources};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "foodscore-server")]
#[command(about = "FoodScore - nutrition label normalization and health scoring API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Serve products from the built-in demo catalogue
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if args.demo {
        config.demo_mode = true;
    }

    logging::init_from_env()?;

    info!("Starting FoodScore API");
    info!("{}", config.summary());
    display_available_endpoints(&config);

    let resources = Arc::new(ServerResources::from_config(config)?);

    if let Err(e) = server::run(resources).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

/// Log the endpoint list once at startup
#[allow(clippy::cognitive_complexity)]
fn display_available_endpoints(config: &ServerConfig) {
    let base = format!("http://{}", config.bind_address());
    info!("=== Available API Endpoints ===");
    info!("   Health Check:      GET    {base}/health");
    info!("   Analyze Image:     POST   {base}/analyze-image");
    info!("   Barcode Lookup:    GET    {base}/search-barcode/{{barcode}}");
    info!("   Name Search:       POST   {base}/search-name");
    info!("   Manual Score:      POST   {base}/health-score");
    info!("   Scoring Rules:     GET    {base}/scoring-rules");
    info!("   History:           GET    {base}/history");
    info!("   History Entry:     GET    {base}/history/{{id}}");
    info!("   Delete Entry:      DELETE {base}/history/{{id}}");
    info!("   Clear History:     DELETE {base}/history");
    info!("=== End of Endpoint List ===");
}
