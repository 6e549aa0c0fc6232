//! Observability for the auth service.
//!
//! # Privacy by Default
//!
//! Service functions use `#[instrument(skip_all)]` and add fields explicitly.
//! Fields fall into three groups:
//! - **SAFE**: logged as-is (token type, outcome, counts)
//! - **HASHED**: logged through [`hash_for_correlation`] (email addresses)
//! - **NEVER**: passwords, raw tokens, the signing secret

pub mod metrics;

use crate::errors::AuthError;
use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// Used for emails so that repeated failed logins for one account can be
/// correlated without storing the address.
///
/// This is NOT a security boundary. It is a one-way digest truncated for
/// readability.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest.iter().take(4).copied().collect::<Vec<u8>>())
}

/// Error categories for metrics labels (bounded cardinality)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad credentials, missing/invalid/expired/revoked tokens
    Authentication,
    /// Inactive accounts
    Authorization,
    /// Request body or state problems (duplicates, unknown status, not found)
    Client,
    /// Storage, crypto and other server-side failures
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Authorization => "authorization",
            ErrorCategory::Client => "client",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&AuthError> for ErrorCategory {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::WrongTokenType
            | AuthError::ExpiredToken
            | AuthError::RevokedToken
            | AuthError::MissingBearerToken
            | AuthError::MissingRefreshToken
            | AuthError::BadCredentials => ErrorCategory::Authentication,
            AuthError::InactiveAccount => ErrorCategory::Authorization,
            AuthError::DuplicateEmail
            | AuthError::InvalidStatus(_)
            | AuthError::DuplicateTeam
            | AuthError::Validation(_)
            | AuthError::UserNotFound
            | AuthError::TeamNotFound
            | AuthError::InvitationNotFound => ErrorCategory::Client,
            AuthError::StoreUnavailable(_) | AuthError::Crypto(_) | AuthError::Internal => {
                ErrorCategory::Internal
            }
        }
    }
}
