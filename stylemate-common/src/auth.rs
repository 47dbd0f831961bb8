//! Identity token verification
//!
//! Protected requests carry `Authorization: Bearer <token>`. The token is a
//! JWT whose `sub` claim identifies the user and whose `email` claim is kept
//! for logging. Tokens are verified with an HS256 secret; decode-only
//! extraction (no signature check) exists for local development and must be
//! enabled explicitly.
//!
//! This module contains only pure functions. The HTTP layer lives in
//! stylemate-server.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::AuthConfig;
use crate::{Error, Result};

/// Caller identity extracted from a verified token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
}

/// Authentication failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Authorization header is not a bearer token")]
    MalformedHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has no subject")]
    MissingSubject,
}

/// Claims read from the token payload
#[derive(Debug, Deserialize)]
struct Claims {
    sub: Option<String>,
    email: Option<String>,
}

impl Claims {
    fn into_identity(self) -> std::result::Result<Identity, AuthError> {
        match self.sub {
            Some(sub) if !sub.trim().is_empty() => Ok(Identity {
                user_id: sub,
                email: self.email,
            }),
            _ => Err(AuthError::MissingSubject),
        }
    }
}

/// Token verification strategy
#[derive(Clone)]
pub enum TokenVerifier {
    /// Signature and expiry checked with a shared HS256 secret
    Hs256 {
        key: DecodingKey,
        validation: Validation,
    },
    /// Payload decoded without any verification (development only)
    DecodeOnly,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenVerifier::Hs256 { validation, .. } => f
                .debug_struct("Hs256")
                .field("audience", &validation.aud)
                .finish_non_exhaustive(),
            TokenVerifier::DecodeOnly => f.write_str("DecodeOnly"),
        }
    }
}

impl TokenVerifier {
    /// Verify with an HS256 secret, optionally requiring an `aud` claim
    pub fn hs256(secret: &str, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        TokenVerifier::Hs256 {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn decode_only() -> Self {
        TokenVerifier::DecodeOnly
    }

    /// Build from configuration
    ///
    /// A configured secret always wins. Without one, decode-only mode must be
    /// requested explicitly, otherwise this is a configuration error.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        match config.jwt_secret.as_deref().map(str::trim) {
            Some(secret) if !secret.is_empty() => {
                Ok(Self::hs256(secret, config.audience.as_deref()))
            }
            _ if config.allow_unverified_tokens => Ok(Self::decode_only()),
            _ => Err(Error::Config(
                "No auth.jwt_secret configured. Set a secret, or set \
                 auth.allow_unverified_tokens = true for development."
                    .to_string(),
            )),
        }
    }

    /// True if signatures are checked
    pub fn is_verifying(&self) -> bool {
        matches!(self, TokenVerifier::Hs256 { .. })
    }

    /// Verify a raw token and extract the caller identity
    pub fn verify(&self, token: &str) -> std::result::Result<Identity, AuthError> {
        let claims = match self {
            TokenVerifier::Hs256 { key, validation } => decode::<Claims>(token, key, validation)
                .map_err(|e| AuthError::InvalidToken(e.to_string()))?
                .claims,
            TokenVerifier::DecodeOnly => decode_payload(token)?,
        };

        claims.into_identity()
    }

    /// Verify the value of an `Authorization` header
    pub fn verify_header(
        &self,
        header_value: Option<&str>,
    ) -> std::result::Result<Identity, AuthError> {
        let token = bearer_token(header_value)?;
        self.verify(token)
    }
}

/// Extract the token from `Bearer <token>`
pub fn bearer_token(header_value: Option<&str>) -> std::result::Result<&str, AuthError> {
    let value = header_value.ok_or(AuthError::MissingHeader)?;
    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MalformedHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

/// Decode the payload segment without verifying anything
fn decode_payload(token: &str) -> std::result::Result<Claims, AuthError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| AuthError::InvalidToken("expected header.payload.signature".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::InvalidToken(format!("payload is not base64url: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::InvalidToken(format!("payload is not JSON: {}", e)))
}
