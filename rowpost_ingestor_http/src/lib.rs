//! HTTP ingestor server.
//!
//! This crate provides a server that accepts CSV files uploaded as
//! `multipart/form-data` and persists every row through the ingestion
//! dispatcher.
//!
//! The server is built using axum and provides a `/v1/upload` endpoint.
//! The same handler is mounted on `/`.

pub mod error;
pub mod source;
pub mod types;
mod upload;

pub use error::{HttpIngestorError, Result};
pub use source::{RecordSourceError, UploadedFile, parse_csv, parse_multipart};
pub use types::{ErrorResponse, UPLOAD_SUCCESS_MESSAGE, UploadResponse};

use axum::{Router, extract::DefaultBodyLimit, routing::post};
use rowpost_ingestor_core::IngestionDispatcher;
use tokio_util::sync::CancellationToken;

use crate::upload::upload_handler;

pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// HTTP ingestor server that receives CSV uploads via HTTP POST requests.
pub struct HttpIngestor {
    state: HttpIngestorState,
    max_body_bytes: usize,
}

#[derive(Clone)]
pub struct HttpIngestorState {
    dispatcher: IngestionDispatcher,
    fatal: CancellationToken,
}

impl HttpIngestor {
    /// Create a new HTTP ingestor.
    ///
    /// The `fatal` token is cancelled when an upload fails in a way that leaves
    /// the process unable to ingest further data.
    pub fn new(dispatcher: IngestionDispatcher, fatal: CancellationToken) -> Self {
        let state = HttpIngestorState { dispatcher, fatal };

        Self {
            state,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn into_router(self) -> Router {
        Router::new()
            .route("/", post(upload_handler))
            .route("/v1/upload", post(upload_handler))
            .layer(DefaultBodyLimit::max(self.max_body_bytes))
            .with_state(self.state)
    }
}
