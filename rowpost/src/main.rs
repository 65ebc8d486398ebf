use clap::{Parser, Subcommand};
use snafu::ResultExt;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{ObservabilitySnafu, Result},
    ingest::IngestArgs,
    serve::ServeArgs,
    upload::UploadArgs,
};

mod error;
mod ingest;
mod serve;
mod store;
mod upload;

#[derive(Parser)]
#[command(name = "rowpost")]
#[command(about = "Ingest CSV uploads into a key-value store")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP upload server
    Serve {
        #[clap(flatten)]
        inner: ServeArgs,
    },
    /// Ingest a local CSV file directly into the store
    Ingest {
        #[clap(flatten)]
        inner: IngestArgs,
    },
    /// Upload a local CSV file to a running server
    Upload {
        #[clap(flatten)]
        inner: UploadArgs,
    },
}

#[tokio::main]
#[snafu::report]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _observability = rowpost_observability::init_observability(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    )
    .context(ObservabilitySnafu {})?;

    let ct = CancellationToken::new();

    tokio::spawn({
        let ct = ct.clone();
        async move {
            let _ = tokio::signal::ctrl_c().await;
            ct.cancel();
        }
    });

    match cli.command {
        Commands::Serve { inner } => inner.run(ct).await,
        Commands::Ingest { inner } => inner.run(ct).await,
        Commands::Upload { inner } => inner.run(ct).await,
    }
}
