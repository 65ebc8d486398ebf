use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;
use tracing::{error, info, warn};

use crate::HttpIngestorState;
use crate::error::{HttpIngestorError, Result};
use crate::source::parse_multipart;
use crate::types::{ErrorResponse, UploadResponse};

/// Handler for the /v1/upload endpoint.
pub async fn upload_handler(
    State(state): State<HttpIngestorState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    match process_upload(&state, &headers, body).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => {
            if err.is_fatal() {
                error!(error = ?err, "Fatal ingestion error. Shutting down.");
                state.fatal.cancel();
            }
            map_error_to_response(err)
        }
    }
}

/// Parse every uploaded file, then ingest them one after the other.
async fn process_upload(
    state: &HttpIngestorState,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<UploadResponse> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let files = parse_multipart(body, content_type).await.inspect_err(|err| {
        warn!(error = %err, "Rejected upload");
    })?;

    let mut records = 0;
    for file in files {
        let file_name = file.file_name.unwrap_or_default();
        info!(
            file_name = %file_name,
            records = file.records.len(),
            "Ingesting uploaded file"
        );
        records += state.dispatcher.ingest(file.records).await?;
    }

    Ok(UploadResponse::success(records))
}

fn map_error_to_response(error: HttpIngestorError) -> Response {
    let status_code = match error {
        HttpIngestorError::ReadCsv { .. } => StatusCode::BAD_REQUEST,
        HttpIngestorError::ProcessFile { .. } | HttpIngestorError::Ingestion { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let response = Json(ErrorResponse {
        message: error.to_string(),
    });

    (status_code, response).into_response()
}
