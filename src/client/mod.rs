//! Remote API client
//!
//! Thin wrapper over `reqwest` that knows the storefront base URL, attaches the
//! bearer token of the current session to every request, and classifies
//! failures into [`ClientError`].

mod error;

pub use error::{ClientError, TRANSPORT_MESSAGE};
pub(crate) use error::extract_message;

use reqwest::{Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ApiConfig;

/// Supplies the bearer token for outgoing requests
///
/// Called once per request so a logout or expiry takes effect immediately.
pub trait TokenSource: Send + Sync {
    /// Current bearer token, `None` when signed out
    fn bearer_token(&self) -> Option<String>;
}

/// HTTP client for the storefront API
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.tokens.is_some())
            .finish()
    }
}

impl ApiClient {
    /// Create an unauthenticated client from configuration
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("furnika/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens: None,
        })
    }

    /// Clone this client with bearer decoration from `source`
    pub fn with_token_source(&self, source: Arc<dyn TokenSource>) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            tokens: Some(source),
        }
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!("{} {}", method, path);
        let builder = self.http.request(method, self.url(path));
        match self.tokens.as_ref().and_then(|source| source.bearer_token()) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// GET a JSON resource
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = send(self.request(Method::GET, path)).await?;
        read_json(response).await
    }

    /// POST a JSON body and decode a JSON response
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = send(self.request(Method::POST, path).json(body)).await?;
        read_json(response).await
    }

    /// PUT a JSON body and decode a JSON response
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = send(self.request(Method::PUT, path).json(body)).await?;
        read_json(response).await
    }

    /// POST a JSON body to an endpoint that answers with a message
    ///
    /// Returns the server's message, or an empty string when the body is empty.
    pub async fn post_message<B>(&self, path: &str, body: &B) -> Result<String, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let response = send(self.request(Method::POST, path).json(body)).await?;
        let text = response.text().await?;
        Ok(extract_message(&text).unwrap_or_default())
    }

    /// DELETE a resource, ignoring any response body
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}

/// Send a request and turn non-success statuses into [`ClientError::Rejected`]
async fn send(builder: RequestBuilder) -> Result<Response, ClientError> {
    let response = builder
        .send()
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_message(&body);
    tracing::debug!("Request rejected with status {}", status.as_u16());
    Err(ClientError::Rejected {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ClientError::Malformed(e.to_string()))
}
