//! Upload progress reported by the transfer collaborator.
//!
//! The browser never moves bytes itself; it only turns these reports into
//! user-facing notices and reloads once the upload dialog is confirmed.

use serde::{Deserialize, Serialize};

/// Per-file status as sent by the upload endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Uploading,
    Done,
    Error,
}

impl UploadStatus {
    /// Check if the file reached a terminal state.
    pub fn is_finished(&self) -> bool {
        !matches!(self, UploadStatus::Uploading)
    }
}

/// Progress information for one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadProgress {
    /// Name of the file being transferred
    pub file_name: String,
    pub status: UploadStatus,
}

impl UploadProgress {
    pub fn new(file_name: impl Into<String>, status: UploadStatus) -> Self {
        Self {
            file_name: file_name.into(),
            status,
        }
    }
}
