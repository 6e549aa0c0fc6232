//! Bearer and refresh token validation.
//!
//! Every presented token goes through the same four checks, in order, and the
//! first failure wins:
//!
//! 1. signature and structure (`MalformedToken`, `InvalidSignature`)
//! 2. token type matches the endpoint (`WrongTokenType`)
//! 3. `now < exp` (`ExpiredToken`)
//! 4. not in the revocation store (`RevokedToken`)
//!
//! The revocation lookup happens on every call. If the store cannot answer,
//! validation fails with `StoreUnavailable`; a token is never accepted on a
//! failed lookup.

use crate::crypto::TokenCodec;
use crate::errors::AuthError;
use crate::observability::metrics::record_token_validation;
use crate::repositories::RevocationRepository;
use common::jwt::{ClaimSet, TokenType};
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

#[derive(Clone)]
pub struct TokenValidator {
    codec: Arc<TokenCodec>,
    revocations: Arc<dyn RevocationRepository>,
}

impl fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenValidator")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl TokenValidator {
    pub fn new(codec: Arc<TokenCodec>, revocations: Arc<dyn RevocationRepository>) -> Self {
        Self { codec, revocations }
    }

    /// Validate `raw` as a token of type `expected` at the current time.
    pub async fn validate(&self, raw: &str, expected: TokenType) -> Result<ClaimSet, AuthError> {
        self.validate_at(raw, expected, chrono::Utc::now().timestamp())
            .await
    }

    /// Validate against an explicit clock.
    #[instrument(skip_all, fields(token_type = %expected))]
    pub async fn validate_at(
        &self,
        raw: &str,
        expected: TokenType,
        now: i64,
    ) -> Result<ClaimSet, AuthError> {
        let result = self.check(raw, expected, now).await;

        match &result {
            Ok(_) => record_token_validation(expected.as_str(), "success", None),
            Err(e) => {
                tracing::debug!(
                    target: "auth.token_validator",
                    reason = e.reason(),
                    "Token rejected"
                );
                record_token_validation(expected.as_str(), "error", Some(e.reason()));
            }
        }

        result
    }

    async fn check(&self, raw: &str, expected: TokenType, now: i64) -> Result<ClaimSet, AuthError> {
        let claims = self.codec.verify(raw)?;

        if claims.token_type != expected {
            return Err(AuthError::WrongTokenType);
        }

        if claims.is_expired_at(now) {
            return Err(AuthError::ExpiredToken);
        }

        if self.revocations.contains(claims.jti).await? {
            return Err(AuthError::RevokedToken);
        }

        Ok(claims)
    }
}
