// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data exchanged with the extraction backend.
//!
//! These mirror the backend's JSON bodies field for field.

use super::region::Rectangle;
use crate::util::geometry::Size;
use serde::{Deserialize, Serialize};

/// An uploaded image as known to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Server-side identifier.
    pub filename: String,
    /// Name of the file the user picked.
    pub original_name: String,
    pub width: u32,
    pub height: u32,
}

impl ImageRef {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Regions of one image, in source pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMaskData {
    pub filename: String,
    pub mask_regions: Vec<Rectangle>,
}

/// Body of `POST /process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub filename: String,
    pub mask_regions: Vec<Rectangle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,
}

/// Body of `POST /process-multiple`; also the export file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub images: Vec<ImageMaskData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,
}

/// Response of `POST /upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
}

/// Response of `GET /files/{filename}`.
#[derive(Debug, Clone, Deserialize)]
pub struct FileInfo {
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

/// Extracted table of a single image.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub masked_filename: String,
    #[serde(default)]
    pub mask_regions_count: usize,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub csv_data: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    pub raw_data: serde_json::Value,
}

/// Extracted tables of a batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub total_images: usize,
    #[serde(default)]
    pub successful_images: usize,
    #[serde(default)]
    pub failed_images: usize,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub csv_data: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    pub failed_files: Vec<String>,
}

/// Table shown after processing, from either response kind.
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Summary line, e.g. batch success counts.
    pub summary: Option<String>,
    /// Pretty-printed raw backend output, when the backend returned any.
    pub raw: Option<String>,
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl ResultTable {
    /// Tab-separated rendering of headers and rows, for the clipboard.
    pub fn to_tsv(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        if !self.headers.is_empty() {
            lines.push(self.headers.join("\t"));
        }
        lines.extend(self.rows.iter().map(|row| row.join("\t")));
        lines.join("\n")
    }
}

impl From<ProcessResponse> for ResultTable {
    fn from(resp: ProcessResponse) -> Self {
        let rows: Vec<Vec<String>> = resp
            .csv_data
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        let mut summary = if resp.masked_filename.is_empty() {
            resp.filename.clone()
        } else {
            format!("{} → {}", resp.filename, resp.masked_filename)
        };
        if !summary.is_empty() {
            summary.push_str(", ");
        }
        summary.push_str(&format!(
            "{} regions, {} rows",
            resp.mask_regions_count,
            rows.len()
        ));
        if !resp.success {
            summary.push_str(" (backend reported failure)");
        }

        Self {
            headers: resp.headers,
            rows,
            summary: Some(summary),
            raw: match resp.raw_data {
                serde_json::Value::Null => None,
                value => serde_json::to_string_pretty(&value).ok(),
            },
        }
    }
}

impl From<BatchResponse> for ResultTable {
    fn from(resp: BatchResponse) -> Self {
        let mut summary = format!(
            "{} of {} images processed",
            resp.successful_images, resp.total_images
        );
        if !resp.success {
            summary.push_str(" (backend reported failure)");
        }
        if resp.failed_images > 0 && resp.failed_files.is_empty() {
            summary.push_str(&format!(", {} failed", resp.failed_images));
        }
        if !resp.failed_files.is_empty() {
            summary.push_str(&format!(", failed: {}", resp.failed_files.join(", ")));
        }
        Self {
            headers: resp.headers,
            rows: resp
                .csv_data
                .iter()
                .map(|row| row.iter().map(cell_text).collect())
                .collect(),
            summary: Some(summary),
            raw: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::region::ImagePoint;

    #[test]
    fn test_process_request_omits_missing_session_name() {
        let request = ProcessRequest {
            filename: "20250101_120000_scan.png".to_string(),
            mask_regions: vec![Rectangle::from_corners(ImagePoint::new(92, 882), ImagePoint::new(250, 1330))],
            session_name: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "filename": "20250101_120000_scan.png",
                "mask_regions": [{"x1": 92, "y1": 882, "x2": 250, "y2": 1330}]
            })
        );
    }

    #[test]
    fn test_process_response_to_table() {
        let resp: ProcessResponse = serde_json::from_value(serde_json::json!({
            "success": true,
            "filename": "scan.png",
            "masked_filename": "masked_scan.png",
            "mask_regions_count": 3,
            "headers": ["file", "length", "count"],
            "csv_data": [["scan.png", 12.1, 1], ["scan.png", null, "3"]],
            "raw_data": {"rows": []}
        }))
        .unwrap();
        let table = ResultTable::from(resp);
        assert_eq!(table.headers.len(), 3);
        assert_eq!(table.rows[0], vec!["scan.png", "12.1", "1"]);
        assert_eq!(table.rows[1], vec!["scan.png", "", "3"]);
        assert_eq!(
            table.summary.as_deref(),
            Some("scan.png → masked_scan.png, 3 regions, 2 rows")
        );
        assert!(table.raw.as_deref().unwrap_or_default().contains("rows"));
    }

    #[test]
    fn test_table_to_tsv() {
        let table = ResultTable {
            headers: vec!["file".to_string(), "length".to_string()],
            rows: vec![
                vec!["scan.png".to_string(), "12.1".to_string()],
                vec!["scan.png".to_string(), String::new()],
            ],
            summary: None,
            raw: None,
        };
        assert_eq!(table.to_tsv(), "file\tlength\nscan.png\t12.1\nscan.png\t");
    }

    #[test]
    fn test_process_response_minimal_body() {
        let resp: ProcessResponse =
            serde_json::from_value(serde_json::json!({"csv_data": []})).unwrap();
        let table = ResultTable::from(resp);
        assert_eq!(
            table.summary.as_deref(),
            Some("0 regions, 0 rows (backend reported failure)")
        );
        assert_eq!(table.to_tsv(), "");
    }

    #[test]
    fn test_batch_response_summary() {
        let resp: BatchResponse = serde_json::from_value(serde_json::json!({
            "success": true,
            "total_images": 3,
            "successful_images": 2,
            "failed_images": 1,
            "headers": [],
            "csv_data": [],
            "results": [],
            "failed_files": ["c.png"]
        }))
        .unwrap();
        let table = ResultTable::from(resp);
        assert_eq!(table.summary.as_deref(), Some("2 of 3 images processed, failed: c.png"));
    }
}
