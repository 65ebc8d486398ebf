use snafu::Snafu;
use tokio::sync::AcquireError;

use crate::id::IdGenerationError;

/// Ingestor error types.
///
/// Store write failures are not part of this enum: they are isolated to the
/// record that caused them and only show up in the logs.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum IngestorError {
    /// Configuration error.
    ///
    /// Returned before any record is submitted.
    #[snafu(display("configuration error: {message}"))]
    Configuration { message: String },
    /// Identifier generation error.
    ///
    /// This error aborts the whole pipeline, not only the affected record.
    #[snafu(display("failed to generate identifier for record {index}"))]
    IdGeneration {
        index: usize,
        source: IdGenerationError,
    },
    /// Admission gate closed.
    #[snafu(display("admission gate closed"))]
    AdmissionClosed { source: AcquireError },
}

impl IngestorError {
    /// Returns true if the error must bring down the whole process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, IngestorError::IdGeneration { .. })
    }
}

pub type Result<T, E = IngestorError> = std::result::Result<T, E>;
