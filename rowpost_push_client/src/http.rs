use reqwest::{
    StatusCode,
    multipart::{Form, Part},
};
use rowpost_ingestor_http::types::{ErrorResponse, UploadResponse};
use snafu::{ResultExt, Snafu};

/// A client for uploading CSV files to rowpost over HTTP.
#[derive(Debug, Clone)]
pub struct HttpUploadClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Snafu)]
pub enum HttpPushClientError {
    #[snafu(display("Request error"))]
    Request { source: reqwest::Error },
    #[snafu(display("Response error: status={status}, message={message}"))]
    Response { status: StatusCode, message: String },
}

pub type Result<T, E = HttpPushClientError> = std::result::Result<T, E>;

impl HttpUploadClient {
    /// Create a new HTTP upload client.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload CSV data as the `file` part of a multipart request.
    pub async fn upload(
        &self,
        file_name: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Result<UploadResponse> {
        let part = Part::bytes(data.into())
            .file_name(file_name.into())
            .mime_str("text/csv")
            .context(RequestSnafu {})?;
        let form = Form::new().part("file", part);

        let url = format!("{}/v1/upload", self.base_url);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context(RequestSnafu {})?;

        if response.status().is_success() {
            return response
                .json::<UploadResponse>()
                .await
                .context(RequestSnafu {});
        }

        let status = response.status();
        let body = response
            .json::<ErrorResponse>()
            .await
            .context(RequestSnafu {})?;

        Err(HttpPushClientError::Response {
            status,
            message: body.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = HttpUploadClient::new("http://127.0.0.1:7780/");
        assert_eq!(client.base_url(), "http://127.0.0.1:7780");
    }
}
