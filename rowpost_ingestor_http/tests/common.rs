#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header::CONTENT_TYPE},
};
use futures::TryStreamExt;
use object_store::{ObjectStore, path::Path};
use rowpost_ingestor_core::{
    DispatcherOptions, IdGenerationError, IngestionDispatcher, RecordIdGenerator,
};
use rowpost_ingestor_http::HttpIngestor;
use rowpost_store::{InMemoryFactory, ObjectStoreClient, ObjectStoreFactory, TableName};
use tokio_util::sync::CancellationToken;

pub const TABLE: &str = "uploads";
pub const BOUNDARY: &str = "rowpost-test-boundary";

pub struct TestServer {
    pub router: Router,
    pub object_store: Arc<dyn ObjectStore>,
    pub fatal: CancellationToken,
}

/// Identifier generator that always fails.
pub struct BrokenIdGenerator;

impl RecordIdGenerator for BrokenIdGenerator {
    fn generate_id(&self) -> Result<String, IdGenerationError> {
        Err(IdGenerationError::new("entropy source unavailable"))
    }
}

pub fn new_test_server() -> TestServer {
    new_test_server_with(None)
}

pub fn new_test_server_with(id_generator: Option<Arc<dyn RecordIdGenerator>>) -> TestServer {
    let object_store = InMemoryFactory.create_object_store().unwrap();
    let store = Arc::new(ObjectStoreClient::new(
        object_store.clone(),
        TableName::new(TABLE).unwrap(),
    ));

    let options = DispatcherOptions { capacity: 4 };
    let dispatcher = match id_generator {
        Some(id_generator) => IngestionDispatcher::new(store, id_generator, options),
        None => IngestionDispatcher::new_ulid(store, options),
    }
    .unwrap();

    let fatal = CancellationToken::new();
    let router = HttpIngestor::new(dispatcher, fatal.clone()).into_router();

    TestServer {
        router,
        object_store,
        fatal,
    }
}

pub fn multipart_body(parts: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, data) in parts {
        body.push_str(&format!("--{BOUNDARY}\r\n"));
        body.push_str(&format!(
            "Content-Disposition: form-data; name=\"{name}\"; filename=\"data.csv\"\r\n\r\n"
        ));
        body.push_str(data);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

pub fn upload_request(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::post(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(body.into())
        .unwrap()
}

pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub async fn stored_records(object_store: &Arc<dyn ObjectStore>) -> Vec<String> {
    object_store
        .list(Some(&Path::from(TABLE)))
        .map_ok(|meta| meta.location.to_string())
        .try_collect()
        .await
        .unwrap()
}
