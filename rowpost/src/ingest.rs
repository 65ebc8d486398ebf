use std::path::PathBuf;

use clap::Args;
use rowpost_ingestor_http::parse_csv;
use snafu::ResultExt;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{CancelledSnafu, IngestorSnafu, ReadFileSnafu, RecordSourceSnafu, Result},
    store::StoreArgs,
};

/// Ingest a local CSV file without going through the HTTP server.
#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Path of the CSV file
    file: PathBuf,
    #[clap(flatten)]
    store: StoreArgs,
}

impl IngestArgs {
    pub async fn run(self, ct: CancellationToken) -> Result<()> {
        let data = tokio::fs::read(&self.file).await.context(ReadFileSnafu {
            path: self.file.clone(),
        })?;

        let records = parse_csv(&data).await.context(RecordSourceSnafu {})?;
        let pipeline = self.store.build_pipeline()?;

        // On cancel no further records are submitted.
        let completed = tokio::select! {
            result = pipeline.dispatcher.ingest(records) => result.context(IngestorSnafu {})?,
            _ = ct.cancelled() => return CancelledSnafu {}.fail(),
        };

        println!("Processed {} records", completed);

        Ok(())
    }
}
