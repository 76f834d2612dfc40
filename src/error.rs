// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Domain errors surfaced to the user as warnings.
//!
//! None of these are fatal: the app logs them and shows the message in the
//! status bar, leaving the masking state untouched.

/// Errors raised by the masking workflow.
#[derive(Debug, thiserror::Error)]
pub enum MaskError {
    /// A picked file is not a recognised image format.
    #[error("only image files can be uploaded: {0}")]
    NotAnImage(String),

    /// Submission attempted without any masked regions.
    #[error("select at least one masking region before processing")]
    NoRegions,

    /// The image could not be fetched or decoded.
    #[error("failed to load image {filename}: {reason}")]
    ImageLoad { filename: String, reason: String },

    /// Width or height of an image is zero.
    #[error("image has invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Completion requested for an image with no regions.
    #[error("select masking regions on {0} before marking it complete")]
    EmptyRegions(String),

    /// Batch finalization requested before every image is complete.
    #[error("complete masking on all images first ({completed} of {total} done)")]
    IncompleteBatch { completed: usize, total: usize },

    #[error("image index {index} out of range (0..{len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Two upload entries share an identifier.
    #[error("duplicate image identifier: {0}")]
    DuplicateImage(String),

    /// A request to the backend is already running.
    #[error("a request is already in progress")]
    SubmissionInFlight,

    /// Non-success response or transport failure from the backend.
    #[error("backend request failed: {0}")]
    Backend(String),
}

impl From<reqwest::Error> for MaskError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => MaskError::Backend(format!("HTTP error! status: {}", status)),
            None => MaskError::Backend(err.to_string()),
        }
    }
}

pub type MaskResult<T> = Result<T, MaskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_batch_message() {
        let err = MaskError::IncompleteBatch { completed: 2, total: 3 };
        assert_eq!(
            err.to_string(),
            "complete masking on all images first (2 of 3 done)"
        );
    }
}
