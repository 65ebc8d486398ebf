use std::{net::AddrParseError, path::PathBuf};

use rowpost_ingestor_core::IngestorError;
use rowpost_ingestor_http::RecordSourceError;
use rowpost_observability::ObservabilityError;
use rowpost_push_client::HttpPushClientError;
use rowpost_store::StoreError;
use snafu::Snafu;

/// CLI error types.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CliError {
    #[snafu(display("Invalid {name} argument: {message}"))]
    InvalidArgument { name: &'static str, message: String },
    #[snafu(display("Store error"))]
    Store { source: StoreError },
    #[snafu(display("Ingestion error"))]
    Ingestor { source: IngestorError },
    #[snafu(display("Failed to read records"))]
    RecordSource { source: RecordSourceError },
    #[snafu(display("Failed to read {}", path.display()))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("IO error"))]
    Io { source: std::io::Error },
    #[snafu(display("Invalid server URL"))]
    InvalidServerUrl { source: AddrParseError },
    #[snafu(display("Upload client error"))]
    PushClient { source: HttpPushClientError },
    #[snafu(display("Failed to initialize observability"))]
    Observability { source: ObservabilityError },
    #[snafu(display("Server stopped after a fatal ingestion error"))]
    FatalIngestion,
    #[snafu(display("Operation cancelled"))]
    Cancelled,
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;
