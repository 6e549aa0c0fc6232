//! Bearer credential contract shared by the auth service and its consumers.
//!
//! Slate issues two kinds of compact JWS tokens, both signed with the same
//! symmetric key:
//!
//! - **access** tokens, presented as `Authorization: Bearer <token>`
//! - **refresh** tokens, carried in the `refresh` cookie
//!
//! Every token carries a [`ClaimSet`]. Downstream services (boards, collab)
//! verify the signature with the shared key and read `sub` to find the caller.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Generic error messages prevent information leakage
//! - `sub` and `jti` are redacted in Debug output

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// Tokens larger than this are rejected before any base64 decoding or
/// signature work. A Slate token is around 300 bytes.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

// =============================================================================
// Error Types
// =============================================================================

/// Errors from the unverified structural checks in this module.
///
/// Messages are intentionally generic. Details go to debug logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token is not a three-part compact JWS or its payload cannot be decoded.
    #[error("The access token is invalid or expired")]
    MalformedToken,
}

// =============================================================================
// Claims Types
// =============================================================================

/// Which role a token plays. Serialized as the `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived bearer credential for protected endpoints.
    Access,
    /// Longer-lived credential accepted only by the refresh endpoint.
    Refresh,
}

impl TokenType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims carried by every Slate token.
///
/// A claim set is built once at issuance and never mutated. `jti` is unique
/// per token and is the key used for revocation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// Subject: the user's `user_uuid`. Redacted in Debug output.
    pub sub: Uuid,

    /// Token identifier. Redacted in Debug output.
    pub jti: Uuid,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Access or refresh.
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

impl fmt::Debug for ClaimSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimSet")
            .field("sub", &"[REDACTED]")
            .field("jti", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .field("token_type", &self.token_type)
            .finish()
    }
}

impl ClaimSet {
    /// True once `now` has reached `exp`. A token is valid only while `now < exp`.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    /// `exp` as a UTC timestamp, or `None` if it is out of chrono's range.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Reject tokens above [`MAX_JWT_SIZE_BYTES`].
///
/// # Errors
///
/// Returns `JwtValidationError::TokenTooLarge` when the limit is exceeded.
pub fn check_token_size(token: &str) -> Result<(), JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }
    Ok(())
}

/// Decode the claim set WITHOUT verifying the signature.
///
/// Only for diagnostics and test assertions. Never make an authorization
/// decision from the result; verify the token first.
///
/// # Errors
///
/// - `TokenTooLarge` if the token exceeds the size limit
/// - `MalformedToken` if the token is not three dot-separated parts or the
///   payload is not a base64url-encoded claim set
pub fn decode_claims_unverified(token: &str) -> Result<ClaimSet, JwtValidationError> {
    check_token_size(token)?;

    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => {
            tracing::debug!(target: "common.jwt", "Token rejected: invalid JWT format");
            return Err(JwtValidationError::MalformedToken);
        }
    };

    let payload_bytes = URL_SAFE_NO_PAD.decode(payload).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT payload base64");
        JwtValidationError::MalformedToken
    })?;

    serde_json::from_slice(&payload_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT claims JSON");
        JwtValidationError::MalformedToken
    })
}
