//! Response types for the HTTP ingestor upload endpoint.

use serde::{Deserialize, Serialize};

pub const UPLOAD_SUCCESS_MESSAGE: &str = "CSV data processed successfully";

/// Response payload for the /v1/upload endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadResponse {
    pub message: String,
    /// Number of records that went through the dispatcher, including the ones
    /// the store failed to persist.
    pub records: usize,
}

/// Response payload for errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub message: String,
}

impl UploadResponse {
    pub fn success(records: usize) -> Self {
        Self {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            records,
        }
    }
}
