use std::path::PathBuf;

use clap::Args;
use rowpost_push_client::HttpUploadClient;
use snafu::ResultExt;
use tokio_util::sync::CancellationToken;

use crate::error::{CancelledSnafu, PushClientSnafu, ReadFileSnafu, Result};

/// Upload a local CSV file to a running server.
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Path of the CSV file
    file: PathBuf,
    /// The address of the remote rowpost server
    #[arg(long, default_value = "http://127.0.0.1:7780")]
    http_address: String,
}

impl UploadArgs {
    pub async fn run(self, ct: CancellationToken) -> Result<()> {
        let data = tokio::fs::read(&self.file).await.context(ReadFileSnafu {
            path: self.file.clone(),
        })?;

        let file_name = self
            .file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());

        let client = HttpUploadClient::new(self.http_address);

        let response = tokio::select! {
            result = client.upload(file_name, data) => result.context(PushClientSnafu {})?,
            _ = ct.cancelled() => return CancelledSnafu {}.fail(),
        };

        println!("{} ({} records)", response.message, response.records);

        Ok(())
    }
}
