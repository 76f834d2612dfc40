// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Mask payload serialization and deserialization.
//!
//! This module handles exporting and importing mask regions in YAML
//! and JSON formats. The file layout is the backend's batch request body.

use crate::models::payload::BatchRequest;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Export a payload to YAML format.
pub fn export_yaml(data: &BatchRequest, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    std::fs::write(path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Export a payload to JSON format.
pub fn export_json(data: &BatchRequest, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Import a payload from YAML format.
pub fn import_yaml(path: &Path) -> Result<BatchRequest> {
    let yaml = std::fs::read_to_string(path)?;
    let data = serde_yaml::from_str(&yaml)?;
    Ok(data)
}

/// Import a payload from JSON format.
pub fn import_json(path: &Path) -> Result<BatchRequest> {
    let json = std::fs::read_to_string(path)?;
    let data = serde_json::from_str(&json)?;
    Ok(data)
}

/// Export choosing the format from the file extension.
pub fn export(data: &BatchRequest, path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => export_yaml(data, path),
        Some("json") => export_json(data, path),
        other => bail!("Unsupported file extension: {:?}", other),
    }
}

/// Import choosing the format from the file extension.
pub fn import(path: &Path) -> Result<BatchRequest> {
    let data = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => import_yaml(path),
        Some("json") => import_json(path),
        other => bail!("Unsupported file extension: {:?}", other),
    };
    data.with_context(|| format!("Failed to import {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payload::ImageMaskData;
    use crate::models::region::{ImagePoint, Rectangle};

    fn sample() -> BatchRequest {
        BatchRequest {
            images: vec![ImageMaskData {
                filename: "20250101_120000_num3.jpg".to_string(),
                mask_regions: vec![
                    Rectangle::from_corners(ImagePoint::new(92, 882), ImagePoint::new(250, 1330)),
                    Rectangle::from_corners(ImagePoint::new(254, 842), ImagePoint::new(424, 1338)),
                ],
            }],
            session_name: Some("Batch Processing".to_string()),
        }
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("tablemask-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_yaml_file_preserves_regions() {
        let path = temp_path("payload.yaml");
        export(&sample(), &path).unwrap();
        let loaded = import(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.images, sample().images);
    }

    #[test]
    fn test_json_import_normalizes_handwritten_regions() {
        let path = temp_path("handwritten.json");
        std::fs::write(
            &path,
            r#"{"images": [{"filename": "a.png", "mask_regions": [{"x1": 50, "y1": 60, "x2": 10, "y2": 20}]}]}"#,
        )
        .unwrap();
        let loaded = import(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let rect = loaded.images[0].mask_regions[0];
        assert_eq!((rect.x1(), rect.y1(), rect.x2(), rect.y2()), (10, 20, 50, 60));
        assert!(loaded.session_name.is_none());
    }

    #[test]
    fn test_unknown_extension_rejected() {
        assert!(export(&sample(), Path::new("payload.csv")).is_err());
    }
}
