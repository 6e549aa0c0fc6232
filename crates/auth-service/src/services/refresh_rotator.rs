//! Refresh-driven reissuance.
//!
//! The presented refresh token is validated like any other token and, if it
//! passes, a completely new pair is issued for the same subject. The old
//! refresh token is not revoked and stays usable until it expires.

use crate::errors::AuthError;
use crate::models::{Identity, TokenPair};
use crate::services::token_issuer::TokenIssuer;
use crate::services::token_validator::TokenValidator;
use common::jwt::TokenType;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct RefreshRotator {
    validator: Arc<TokenValidator>,
    issuer: Arc<TokenIssuer>,
}

impl RefreshRotator {
    pub fn new(validator: Arc<TokenValidator>, issuer: Arc<TokenIssuer>) -> Self {
        Self { validator, issuer }
    }

    pub async fn rotate(&self, raw_refresh: &str) -> Result<TokenPair, AuthError> {
        self.rotate_at(raw_refresh, chrono::Utc::now().timestamp())
            .await
    }

    /// Rotate against an explicit clock. The new pair is issued at `now`.
    #[instrument(skip_all)]
    pub async fn rotate_at(&self, raw_refresh: &str, now: i64) -> Result<TokenPair, AuthError> {
        let claims = self
            .validator
            .validate_at(raw_refresh, TokenType::Refresh, now)
            .await?;

        // Tokens only carry the subject; email is not needed to sign.
        let identity = Identity {
            user_uuid: claims.sub,
            email: String::new(),
        };

        self.issuer.issue_at(&identity, now)
    }
}
