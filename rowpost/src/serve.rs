use std::net::SocketAddr;

use clap::Args;
use rowpost_ingestor_http::{DEFAULT_MAX_BODY_BYTES, HttpIngestor};
use snafu::ResultExt;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::{
    error::{FatalIngestionSnafu, InvalidServerUrlSnafu, IoSnafu, Result},
    store::StoreArgs,
};

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// The address of the HTTP ingestor server.
    #[arg(long, env = "ROWPOST_HTTP_ADDRESS", default_value = "127.0.0.1:7780")]
    http_address: String,
    /// Maximum size of an upload body, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,
    #[clap(flatten)]
    store: StoreArgs,
}

impl ServeArgs {
    pub async fn run(self, ct: CancellationToken) -> Result<()> {
        let http_address = self
            .http_address
            .parse::<SocketAddr>()
            .context(InvalidServerUrlSnafu {})?;

        let pipeline = self.store.build_pipeline()?;

        println!("HTTP ingestor listening on {}", http_address);
        println!("Writing records to table {}", self.store.table);

        let fatal = CancellationToken::new();
        let ingestor = HttpIngestor::new(pipeline.dispatcher.clone(), fatal.clone())
            .with_max_body_bytes(self.max_body_bytes);

        let listener = TcpListener::bind(&http_address)
            .await
            .context(IoSnafu {})?;

        run_http_server(listener, ingestor, fatal, ct).await
    }
}

/// Serve uploads until `ct` is cancelled or an upload hits a fatal error.
///
/// Uploads already running on other connections finish before this returns.
async fn run_http_server(
    listener: TcpListener,
    ingestor: HttpIngestor,
    fatal: CancellationToken,
    ct: CancellationToken,
) -> Result<()> {
    let shutdown = {
        let fatal = fatal.clone();
        async move {
            tokio::select! {
                _ = ct.cancelled() => {}
                _ = fatal.cancelled() => {}
            }
        }
    };

    axum::serve(listener, ingestor.into_router())
        .with_graceful_shutdown(shutdown)
        .await
        .context(IoSnafu {})?;

    if fatal.is_cancelled() {
        error!("HTTP ingestor stopped after a fatal ingestion error");
        return FatalIngestionSnafu {}.fail();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use rowpost_ingestor_core::{
        DispatcherOptions, IdGenerationError, IngestionDispatcher, RecordIdGenerator,
    };
    use rowpost_push_client::{HttpPushClientError, HttpUploadClient};
    use rowpost_store::{InMemoryFactory, ObjectStoreClient, ObjectStoreFactory, TableName};

    use super::*;
    use crate::error::CliError;

    struct ExhaustedIdGenerator;

    impl RecordIdGenerator for ExhaustedIdGenerator {
        fn generate_id(&self) -> Result<String, IdGenerationError> {
            Err(IdGenerationError::new("entropy source exhausted"))
        }
    }

    async fn start_server(
        id_generator: Arc<dyn RecordIdGenerator>,
        ct: CancellationToken,
    ) -> (String, tokio::task::JoinHandle<Result<()>>) {
        let store = ObjectStoreClient::new(
            InMemoryFactory.create_object_store().unwrap(),
            TableName::new("records").unwrap(),
        );
        let dispatcher = IngestionDispatcher::new(
            Arc::new(store),
            id_generator,
            DispatcherOptions::default(),
        )
        .unwrap();

        let fatal = CancellationToken::new();
        let ingestor = HttpIngestor::new(dispatcher, fatal.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let server = tokio::spawn(run_http_server(listener, ingestor, fatal, ct));

        (base_url, server)
    }

    #[tokio::test]
    async fn test_server_exits_after_fatal_ingestion_error() {
        let ct = CancellationToken::new();
        let (base_url, server) = start_server(Arc::new(ExhaustedIdGenerator), ct).await;

        let err = HttpUploadClient::new(base_url)
            .upload("records.csv", "1,Alice\n")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HttpPushClientError::Response { status, .. } if status.as_u16() == 500
        ));

        let result = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server shuts down")
            .unwrap();
        assert!(matches!(result, Err(CliError::FatalIngestion)));
    }

    #[tokio::test]
    async fn test_server_exits_cleanly_on_cancel() {
        let ct = CancellationToken::new();
        let (base_url, server) =
            start_server(Arc::new(rowpost_ingestor_core::UlidRecordIdGenerator), ct.clone())
                .await;

        let response = HttpUploadClient::new(base_url)
            .upload("records.csv", "1,Alice\n2,Bob\n")
            .await
            .unwrap();
        assert_eq!(response.records, 2);

        ct.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server shuts down")
            .unwrap();
        assert!(result.is_ok());
    }
}
