//! HTTP transport for network-based API calls

use crate::{ClientConfig, ClientError, ClientResult, Session};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::error::{ApiResponse, ErrorCode};

/// HTTP transport for making requests to the Roost API
///
/// Attaches `Authorization: Bearer <token>` from the shared [`Session`]
/// whenever a token is present. Does not retry; the caller decides what a
/// failure means.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    session: Session,
}

impl HttpClient {
    /// Create a new HTTP transport from configuration
    pub fn new(config: &ClientConfig, session: Session) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build authorization header value
    fn auth_header(&self) -> Option<String> {
        self.session.token().map(|t| format!("Bearer {}", t))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let mut request = self.client.get(self.url(path));

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let mut request = self.client.post(self.url(path)).json(body);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request without body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let mut request = self.client.post(self.url(path));

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    ///
    /// Non-2xx responses are normalized in two passes: first try the
    /// structured error envelope (code + message + details), then fall
    /// back to extracting a `message` field from whatever JSON came back,
    /// then to the raw body or status line.
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;

            if let Ok(envelope) = serde_json::from_str::<ApiResponse<serde_json::Value>>(&text) {
                if let Some(raw) = envelope.code.filter(|c| *c != 0) {
                    let code = ErrorCode::try_from(raw).unwrap_or(ErrorCode::Unknown);
                    return Err(ClientError::Api {
                        code,
                        message: envelope.message,
                        details: envelope.details,
                    });
                }
            }

            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
                .unwrap_or_else(|| {
                    if text.is_empty() {
                        status.to_string()
                    } else {
                        text.clone()
                    }
                });

            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized(message)),
                StatusCode::FORBIDDEN => Err(ClientError::Forbidden(message)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
                StatusCode::BAD_REQUEST => Err(ClientError::Validation(message)),
                _ => Err(ClientError::Internal(message)),
            };
        }

        response.json().await.map_err(Into::into)
    }
}
