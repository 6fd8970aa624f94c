//! Session service
//!
//! Owns the client-side session lifecycle:
//! - Credential login and OAuth redirect completion
//! - Reading the stored session with lazy expiry
//! - Logout
//! - Registration and password reset requests
//!
//! The session record lives under a single storage key. Nothing else reads or
//! writes that key; other components ask this service, or subscribe to it.

use crate::client::{ApiClient, ClientError, TokenSource};
use crate::models::SessionRecord;
use crate::services::token::decode_claims;
use crate::storage::{KeyValueStore, SESSION_KEY};
use anyhow::Context;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Error types for session service operations
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The Remote API call failed (transport, rejection or bad response,
    /// including a sign-in token the client cannot read)
    #[error(transparent)]
    Api(#[from] ClientError),

    /// Input rejected before anything was sent
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error (storage)
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl AuthError {
    /// Message suitable for showing to a user
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Api(e) => e.user_message(),
            AuthError::ValidationError(message) => message.clone(),
            AuthError::InternalError(_) => {
                "Your session could not be saved. Please try again.".to_string()
            }
        }
    }
}

/// Why an OAuth redirect did not produce a session
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OAuthFailure {
    /// The provider redirected back with `?error=<reason>`
    #[error("OAuth provider reported an error: {0}")]
    Provider(String),

    /// Neither a token nor an error was present
    #[error("OAuth redirect carried no token")]
    MissingToken,

    /// The token could not be decoded into a session
    #[error("OAuth token is invalid: {0}")]
    InvalidToken(String),

    /// The session could not be stored
    #[error("Failed to store session: {0}")]
    Storage(String),
}

impl OAuthFailure {
    /// Short reason code passed back to the login screen
    pub fn reason(&self) -> &str {
        match self {
            OAuthFailure::Provider(reason) => reason,
            OAuthFailure::MissingToken => "unknown_error",
            OAuthFailure::InvalidToken(_) => "token_invalid",
            OAuthFailure::Storage(_) => "storage_error",
        }
    }

    /// Login path carrying the error indicator
    pub fn login_redirect(&self) -> String {
        format!("/login?error={}", urlencoding::encode(self.reason()))
    }
}

/// Input for credential login
#[derive(Debug, Clone, Serialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl LoginInput {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Input for account registration
#[derive(Debug, Clone, Serialize)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct PasswordBody<'a> {
    password: &'a str,
}

/// Session manager for the currently authenticated user
pub struct SessionManager {
    client: ApiClient,
    store: Arc<dyn KeyValueStore>,
    state: watch::Sender<Option<SessionRecord>>,
}

impl SessionManager {
    /// Create a session manager; `client` should be unauthenticated
    pub fn new(client: ApiClient, store: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            client,
            store,
            state,
        }
    }

    /// Login with credentials
    ///
    /// On success the record is stored, published to subscribers and
    /// returned. On failure the stored session is left untouched.
    pub async fn login(&self, input: LoginInput) -> Result<SessionRecord, AuthError> {
        if input.username.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::ValidationError(
                "Username and password are required".to_string(),
            ));
        }

        let record: SessionRecord = self
            .client
            .post_json("/auth/signin", &input)
            .await
            .map_err(|e| {
                tracing::warn!("Login failed for '{}': {}", input.username, e);
                e
            })?;

        if record.token.trim().is_empty() {
            return Err(ClientError::Malformed("sign-in response carried no token".to_string()).into());
        }
        if let Err(e) = decode_claims(&record.token) {
            tracing::warn!("Sign-in response for '{}' carried an unreadable token", input.username);
            return Err(ClientError::Malformed(e.to_string()).into());
        }

        self.save(&record)?;
        self.publish(Some(record.clone()));
        tracing::info!("User '{}' signed in", record.username);
        Ok(record)
    }

    /// Complete an OAuth login from the redirect URL (or its query string)
    ///
    /// A `token` parameter wins over an `error` parameter. The token's
    /// signature is not checked; a token that cannot be decoded never
    /// reaches the store.
    pub fn complete_oauth_redirect(&self, url: &str) -> Result<SessionRecord, OAuthFailure> {
        let params = query_params(url);

        let token = match params.get("token").map(|t| t.trim()).filter(|t| !t.is_empty()) {
            Some(token) => token.to_string(),
            None => {
                let failure = match params.get("error").filter(|e| !e.is_empty()) {
                    Some(reason) => OAuthFailure::Provider(reason.clone()),
                    None => OAuthFailure::MissingToken,
                };
                tracing::warn!("OAuth login failed: {}", failure);
                return Err(failure);
            }
        };

        let record = decode_claims(&token)
            .and_then(|claims| claims.into_record(token))
            .map_err(|e| {
                tracing::warn!("OAuth token rejected: {}", e);
                OAuthFailure::InvalidToken(e.to_string())
            })?;

        self.save(&record)
            .map_err(|e| OAuthFailure::Storage(e.to_string()))?;
        self.publish(Some(record.clone()));
        tracing::info!("User '{}' signed in via OAuth", record.username);
        Ok(record)
    }

    /// Read the current session
    ///
    /// Returns `None` when nothing is stored, when the stored record cannot be
    /// read, or when its token has expired. Unreadable and expired records are
    /// removed from the store.
    pub fn current_session(&self) -> Option<SessionRecord> {
        let raw = match self.store.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read session store: {:#}", e);
                return None;
            }
        };

        let record: SessionRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Discarding unreadable session record: {}", e);
                self.discard();
                return None;
            }
        };

        match decode_claims(&record.token) {
            Ok(claims) if claims.is_expired() => {
                tracing::info!("Session of '{}' expired", record.username);
                self.discard();
                None
            }
            Ok(_) => Some(record),
            Err(e) => {
                tracing::warn!("Discarding session with unreadable token: {}", e);
                self.discard();
                None
            }
        }
    }

    /// Re-read the store and publish the result to subscribers
    pub fn refresh(&self) -> Option<SessionRecord> {
        let session = self.current_session();
        self.publish(session.clone());
        session
    }

    /// Logout; removes the stored session and never fails
    pub fn logout(&self) {
        if let Err(e) = self.store.remove(SESSION_KEY) {
            tracing::warn!("Failed to remove stored session: {:#}", e);
        }
        self.publish(None);
        tracing::info!("Signed out");
    }

    /// Check if the current session holds `required_role`
    pub fn has_role(&self, required_role: &str) -> bool {
        is_authorized(self.current_session().as_ref(), required_role)
    }

    /// Subscribe to session changes
    ///
    /// The receiver starts with the last published value; call [`refresh`]
    /// once at startup to seed it from the store.
    ///
    /// [`refresh`]: SessionManager::refresh
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionRecord>> {
        self.state.subscribe()
    }

    /// Register a new account, returns the server's message
    pub async fn register(&self, input: RegisterInput) -> Result<String, AuthError> {
        if input.username.trim().is_empty() {
            return Err(AuthError::ValidationError("Username cannot be empty".to_string()));
        }
        validate_email(&input.email)?;
        if input.password.is_empty() {
            return Err(AuthError::ValidationError("Password cannot be empty".to_string()));
        }

        let message = self.client.post_message("/auth/signup", &input).await?;
        tracing::info!("Registered account '{}'", input.username);
        Ok(message)
    }

    /// Request a password reset mail, returns the server's message
    pub async fn forgot_password(&self, email: &str) -> Result<String, AuthError> {
        validate_email(email)?;
        let message = self
            .client
            .post_message("/auth/forgot-password", &EmailBody { email: email.trim() })
            .await?;
        Ok(message)
    }

    /// Set a new password using the token from the reset mail
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<String, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::ValidationError("Reset token is missing".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::ValidationError("Password cannot be empty".to_string()));
        }

        let path = format!("/auth/reset-password?token={}", urlencoding::encode(token.trim()));
        let message = self
            .client
            .post_message(&path, &PasswordBody { password })
            .await?;
        Ok(message)
    }

    fn save(&self, record: &SessionRecord) -> anyhow::Result<()> {
        let json = serde_json::to_string(record).context("Failed to serialize session")?;
        self.store
            .set(SESSION_KEY, &json)
            .context("Failed to store session")
    }

    fn discard(&self) {
        if let Err(e) = self.store.remove(SESSION_KEY) {
            tracing::warn!("Failed to purge stored session: {:#}", e);
        }
        self.publish(None);
    }

    fn publish(&self, session: Option<SessionRecord>) {
        self.state.send_if_modified(|current| {
            if *current == session {
                false
            } else {
                *current = session;
                true
            }
        });
    }
}

impl TokenSource for SessionManager {
    fn bearer_token(&self) -> Option<String> {
        self.current_session().map(|session| session.token)
    }
}

/// Check if `session` exists and holds `required_role`
pub fn is_authorized(session: Option<&SessionRecord>, required_role: &str) -> bool {
    session.is_some_and(|s| s.has_role(required_role))
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AuthError::ValidationError(format!("Invalid email address: '{}'", email))),
    }
}

/// Parse the query parameters of a URL, path or bare query string
///
/// Keys and values are percent-decoded (`+` counts as a space); the first
/// occurrence of a key wins.
pub fn query_params(url: &str) -> HashMap<String, String> {
    let without_fragment = url.split('#').next().unwrap_or_default();
    let query = match without_fragment.split_once('?') {
        Some((_, query)) => query,
        None if without_fragment.contains('=') => without_fragment,
        None => "",
    };

    let mut params = HashMap::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key);
        if key.is_empty() {
            continue;
        }
        params.entry(key).or_insert_with(|| decode_component(value));
    }
    params
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}
