//! Bearer token decoding
//!
//! Reads the claims of the JWT issued by the storefront API. The signature is
//! NOT verified here: the claims only drive client-side branching (who is
//! signed in, which screens to offer) while the server re-checks the token on
//! every protected call.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::models::{merge_roles, OneOrMany, SessionRecord};

/// Claims carried by a storefront token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawClaims")]
pub struct TokenClaims {
    /// Subject, the username
    pub sub: String,
    /// User ID
    #[serde(default)]
    pub id: Option<i64>,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// Granted roles (`role` and `roles` claims merged)
    pub roles: Vec<String>,
    /// Expiration time (UTC Unix timestamp, seconds)
    pub exp: i64,
}

#[derive(Deserialize)]
struct RawClaims {
    sub: String,
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<OneOrMany>,
    #[serde(default)]
    roles: Option<OneOrMany>,
    exp: i64,
}

impl From<RawClaims> for TokenClaims {
    fn from(raw: RawClaims) -> Self {
        Self {
            sub: raw.sub,
            id: raw.id,
            email: raw.email,
            roles: merge_roles(raw.role, raw.roles),
            exp: raw.exp,
        }
    }
}

impl TokenClaims {
    /// Expiration as a timestamp, `None` if out of range
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Check if the token expired before `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp < now.timestamp()
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Build a session record around the raw token these claims came from
    pub fn into_record(self, token: String) -> Result<SessionRecord, TokenError> {
        let id = self.id.ok_or(TokenError::MissingClaim("id"))?;
        Ok(SessionRecord {
            id,
            username: self.sub,
            email: self.email.unwrap_or_default(),
            roles: self.roles,
            token,
        })
    }
}

/// Error types for token decoding
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Not a decodable JWT (bad segments, base64 or JSON)
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// A claim the client relies on is absent
    #[error("Token is missing the '{0}' claim")]
    MissingClaim(&'static str),
}

/// Decode the claims of a JWT without verifying its signature or expiry
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(TokenError::Malformed("empty token".to_string()));
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| TokenError::Malformed(e.to_string()))
}
