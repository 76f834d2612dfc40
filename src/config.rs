// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Settings are read from a YAML file. The path comes from the
//! `TABLEMASK_CONFIG` environment variable, falling back to
//! `tablemask.yaml` in the working directory. A missing file means
//! defaults; a malformed one is an error.

use crate::util::geometry::{ScalePolicy, Size};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "TABLEMASK_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "tablemask.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the extraction backend.
    pub backend_url: String,
    /// Internal resolution of the masking canvas.
    pub display: Size,
    pub scale_policy: ScalePolicy,
    /// Initial value of the auto-advance toggle.
    pub auto_advance: bool,
    /// HTTP timeout in seconds; processing runs a model and can be slow.
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            display: Size::new(800, 600),
            scale_policy: ScalePolicy::Fit,
            auto_advance: true,
            request_timeout_secs: 300,
        }
    }
}

impl AppConfig {
    /// Load from the configured location.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    /// Load from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_yaml(&yaml)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        if config.display.is_empty() {
            anyhow::bail!(
                "display size must be positive, got {}x{}",
                config.display.width,
                config.display.height
            );
        }
        Ok(config)
    }
}
