//! HTTP client for uploading CSV files to a rowpost server.

pub mod http;

pub use http::{HttpPushClientError, HttpUploadClient, Result};
