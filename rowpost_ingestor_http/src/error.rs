use rowpost_ingestor_core::IngestorError;
use thiserror::Error;

use crate::source::RecordSourceError;

/// Errors that can occur in the HTTP ingestor.
#[derive(Error, Debug)]
pub enum HttpIngestorError {
    #[error("Error processing file")]
    ProcessFile { source: RecordSourceError },
    #[error("Error reading CSV: {source}")]
    ReadCsv { source: RecordSourceError },
    #[error("Error ingesting records: {source}")]
    Ingestion { source: IngestorError },
}

impl From<RecordSourceError> for HttpIngestorError {
    fn from(source: RecordSourceError) -> Self {
        if source.is_csv() {
            HttpIngestorError::ReadCsv { source }
        } else {
            HttpIngestorError::ProcessFile { source }
        }
    }
}

impl From<IngestorError> for HttpIngestorError {
    fn from(source: IngestorError) -> Self {
        HttpIngestorError::Ingestion { source }
    }
}

impl HttpIngestorError {
    /// Returns true if the server must stop accepting uploads.
    pub fn is_fatal(&self) -> bool {
        match self {
            HttpIngestorError::Ingestion { source } => source.is_fatal(),
            _ => false,
        }
    }
}

pub type Result<T, E = HttpIngestorError> = std::result::Result<T, E>;
