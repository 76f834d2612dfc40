// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Client for the extraction backend.
//!
//! All calls block, so the app runs them through [`InFlight`] on a worker
//! thread and polls for the result each frame.

use crate::error::{MaskError, MaskResult};
use crate::models::payload::{
    BatchRequest, BatchResponse, FileInfo, ImageRef, ProcessRequest, ProcessResponse,
    UploadResponse,
};
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::time::Duration;

/// Blocking HTTP client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("tablemask/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// URL the backend serves an uploaded image from.
    pub fn image_url(&self, filename: &str) -> String {
        self.url(&format!("uploads/{}", filename))
    }

    /// Upload a local image and look up its pixel dimensions.
    pub fn upload(&self, path: &Path) -> MaskResult<ImageRef> {
        crate::io::media::ensure_image(path)?;

        let original_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let form = reqwest::blocking::multipart::Form::new()
            .file("file", path)
            .map_err(|e| MaskError::Backend(format!("cannot read {}: {}", path.display(), e)))?;

        let uploaded: UploadResponse = self
            .http
            .post(self.url("upload"))
            .multipart(form)
            .send()?
            .error_for_status()?
            .json()?;
        log::info!("Uploaded {} as {}", original_name, uploaded.filename);

        let info: FileInfo = self
            .http
            .get(self.url(&format!("files/{}", uploaded.filename)))
            .send()?
            .error_for_status()?
            .json()?;

        Ok(ImageRef {
            filename: info.filename,
            original_name,
            width: info.width,
            height: info.height,
        })
    }

    /// Fetch the encoded bytes of an uploaded image.
    pub fn fetch_image(&self, filename: &str) -> MaskResult<Vec<u8>> {
        let bytes = self
            .http
            .get(self.image_url(filename))
            .send()?
            .error_for_status()?
            .bytes()?;
        Ok(bytes.to_vec())
    }

    /// Mask and extract a single image.
    pub fn process(&self, request: &ProcessRequest) -> MaskResult<ProcessResponse> {
        if request.mask_regions.is_empty() {
            return Err(MaskError::NoRegions);
        }
        log::info!(
            "Processing {} with {} regions",
            request.filename,
            request.mask_regions.len()
        );
        let response = self
            .http
            .post(self.url("process"))
            .json(request)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response)
    }

    /// Mask and extract a finalized batch.
    pub fn process_multiple(&self, request: &BatchRequest) -> MaskResult<BatchResponse> {
        log::info!("Processing batch of {} images", request.images.len());
        let response = self
            .http
            .post(self.url("process-multiple"))
            .json(request)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response)
    }
}

/// Session name sent along with processing requests.
pub fn session_name(kind: &str) -> String {
    format!("{} {}", kind, chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))
}

/// A background request with at most one instance running.
#[derive(Debug)]
pub struct InFlight<T> {
    pending: Option<(String, Receiver<T>)>,
}

impl<T> Default for InFlight<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T: Send + 'static> InFlight<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `job` on a worker thread. Refused while another job runs.
    pub fn start<F>(&mut self, label: impl Into<String>, job: F) -> MaskResult<()>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        if self.pending.is_some() {
            return Err(MaskError::SubmissionInFlight);
        }
        let (sender, receiver) = channel();
        std::thread::spawn(move || {
            let _ = sender.send(job());
        });
        self.pending = Some((label.into(), receiver));
        Ok(())
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Label of the running job, for the busy indicator.
    pub fn label(&self) -> Option<&str> {
        self.pending.as_ref().map(|(label, _)| label.as_str())
    }

    /// Non-blocking check for the job's result.
    pub fn poll(&mut self) -> Option<T> {
        let (_, receiver) = self.pending.as_ref()?;
        match receiver.try_recv() {
            Ok(value) => {
                self.pending = None;
                Some(value)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::error!("Background job ended without a result");
                self.pending = None;
                None
            }
        }
    }
}
