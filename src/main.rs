// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tablemask - region masking for table extraction
//!
//! A desktop client for uploading scanned images, marking rectangular
//! regions to mask and sending them to the extraction backend.

mod app;
mod config;
mod error;
mod io;
mod models;
mod ui;
mod util;

use anyhow::{Context, Result};
use app::MaskApp;
use config::AppConfig;
use io::backend::BackendClient;
use std::time::Duration;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = AppConfig::load()?;
    let backend = BackendClient::new(
        &config.backend_url,
        Duration::from_secs(config.request_timeout_secs),
    )
    .context("Failed to create HTTP client")?;
    log::info!("Using backend at {}", backend.base_url());

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Tablemask - Region Masking for Table Extraction"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Tablemask",
        options,
        Box::new(move |_cc| Ok(Box::new(MaskApp::new(config, backend)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
