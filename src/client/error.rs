//! API client errors

use serde::Deserialize;

/// Message shown when the server could not be reached at all
pub const TRANSPORT_MESSAGE: &str =
    "Could not reach the server. Please check your connection and try again.";

/// Error types for Remote API calls
///
/// Every failed call falls into exactly one of three classes: nothing came
/// back, the server said no, or the server said something we cannot read.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No response reached the client (connect error, timeout, TLS failure)
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("Request rejected with status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        /// Server-provided message, if the body carried one
        message: Option<String>,
    },

    /// The server answered successfully but the body had an unexpected shape
    #[error("Unexpected response: {0}")]
    Malformed(String),
}

impl ClientError {
    /// HTTP status of a rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if the server refused the caller's identity or permissions
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// Message suitable for showing to a user
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport(_) => TRANSPORT_MESSAGE.to_string(),
            ClientError::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            ClientError::Rejected { status, message: None } => match status {
                401 => "Your credentials were not accepted.".to_string(),
                403 => "You are not allowed to do this.".to_string(),
                404 => "The requested item does not exist.".to_string(),
                _ => format!("The server rejected the request (status {}).", status),
            },
            ClientError::Malformed(_) => {
                "The server sent an unexpected response. Please try again later.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Malformed(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Longest plain-text body still shown to a user
const MAX_PLAIN_MESSAGE_LEN: usize = 300;

/// Pull a human-readable message out of an error or message body
///
/// Accepts `{"message": ".."}`, `{"error": ".."}` or a short plain-text body.
/// Markup (proxy error pages) and oversized text yield `None`.
pub(crate) fn extract_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed
            .message
            .or(parsed.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty()),
        Err(_) if body.starts_with('{') || body.starts_with('[') => None,
        Err(_) if body.starts_with('<') => None,
        Err(_) if body.chars().count() > MAX_PLAIN_MESSAGE_LEN => None,
        Err(_) => Some(body.to_string()),
    }
}
