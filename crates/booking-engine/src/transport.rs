//! Request/response port to the booking backend.
//!
//! Every backend response is an envelope `{success, message, data}`.
//! [`decode_response`] turns a raw status + body into that envelope or a
//! [`TransportError`]; [`HttpTransport`] is the reqwest-backed adapter.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransportError;

/// Message used when a failed response carries no `message` of its own.
pub const UNKNOWN_SERVER_ERROR: &str = "Unknown server error.";

/// Message used when a 2xx response is not a successful envelope.
pub const UNEXPECTED_RESPONSE: &str = "Unexpected response structure.";

/// The backend's response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl ApiResponse {
    /// Decode `data` into a typed value.
    ///
    /// # Errors
    /// Returns `TransportError::Decode` if `data` has a different shape.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        T::deserialize(&self.data).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// A file attached to a form answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    /// MIME type; the backend sniffs the content when absent.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Single-shot access to the backend. Paths are relative to the API root,
/// e.g. `public/bookings/abc123`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<ApiResponse, TransportError>;

    async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, TransportError>;

    /// POST one file as `multipart/form-data` under the part name `file`.
    async fn post_file(
        &self,
        path: &str,
        file: &UploadFile,
    ) -> Result<ApiResponse, TransportError>;
}

/// Classify a raw HTTP response.
///
/// - non-2xx: `Status` with the body's `message`, or [`UNKNOWN_SERVER_ERROR`]
/// - 2xx without `success: true`: `Envelope` with [`UNEXPECTED_RESPONSE`]
///
/// # Errors
/// As listed above.
pub fn decode_response(status: u16, body: &[u8]) -> Result<ApiResponse, TransportError> {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();

    if !(200..300).contains(&status) {
        let message = parsed
            .as_ref()
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .unwrap_or(UNKNOWN_SERVER_ERROR)
            .to_string();
        return Err(TransportError::Status { status, message });
    }

    match parsed {
        Some(body) if body.get("success").and_then(Value::as_bool) == Some(true) => {
            serde_json::from_value(body)
                .map_err(|_| TransportError::Envelope(UNEXPECTED_RESPONSE.to_string()))
        }
        _ => Err(TransportError::Envelope(UNEXPECTED_RESPONSE.to_string())),
    }
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::header::ACCEPT;
    use reqwest::multipart::{Form, Part};
    use reqwest::{Client, RequestBuilder};
    use serde_json::Value;
    use tracing::{debug, instrument};

    use super::{decode_response, ApiResponse, Transport, UploadFile};
    use crate::config::ClientConfig;
    use crate::error::TransportError;

    /// reqwest-backed [`Transport`].
    ///
    /// Attaches `Authorization: Bearer <token>` when a token is configured.
    /// No retries.
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        client: Client,
        base_url: String,
        token: Option<String>,
    }

    impl HttpTransport {
        /// Build a transport from client configuration.
        ///
        /// # Errors
        /// Returns `TransportError::Network` if the HTTP client cannot be built.
        pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
            let client = Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .map_err(|e| {
                    TransportError::Network(format!("Failed to build HTTP client: {}", e))
                })?;

            Ok(Self {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                token: config.token.clone().filter(|token| !token.is_empty()),
            })
        }

        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        fn url(&self, path: &str) -> String {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }

        async fn send(&self, request: RequestBuilder) -> Result<ApiResponse, TransportError> {
            let request = match &self.token {
                Some(token) => request.bearer_auth(token),
                None => request,
            };

            let response = request
                .header(ACCEPT, "application/json")
                .send()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;

            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;

            debug!(status, bytes = body.len(), "response received");
            decode_response(status, &body)
        }
    }

    #[async_trait]
    impl Transport for HttpTransport {
        #[instrument(skip(self), fields(path = %path))]
        async fn get(&self, path: &str) -> Result<ApiResponse, TransportError> {
            let url = self.url(path);
            debug!(url = %url, "GET request");
            self.send(self.client.get(&url)).await
        }

        #[instrument(skip(self, body), fields(path = %path))]
        async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, TransportError> {
            let url = self.url(path);
            debug!(url = %url, "POST request");
            self.send(self.client.post(&url).json(body)).await
        }

        #[instrument(skip(self, file), fields(path = %path, file = %file.name))]
        async fn post_file(
            &self,
            path: &str,
            file: &UploadFile,
        ) -> Result<ApiResponse, TransportError> {
            let mut part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
            if let Some(content_type) = &file.content_type {
                part = part
                    .mime_str(content_type)
                    .map_err(|e| TransportError::Network(e.to_string()))?;
            }

            let url = self.url(path);
            debug!(url = %url, bytes = file.bytes.len(), "multipart POST request");
            let form = Form::new().part("file", part);
            self.send(self.client.post(&url).multipart(form)).await
        }
    }
}
