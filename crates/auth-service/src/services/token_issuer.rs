//! Token pair issuance.

use crate::crypto::TokenCodec;
use crate::errors::AuthError;
use crate::models::{Identity, IssuedToken, TokenPair};
use common::jwt::{ClaimSet, TokenType};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Builds signed access/refresh pairs. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    codec: Arc<TokenCodec>,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl TokenIssuer {
    pub fn new(codec: Arc<TokenCodec>, access_ttl_seconds: i64, refresh_ttl_seconds: i64) -> Self {
        Self {
            codec,
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    /// Issue a fresh pair for `identity` at the current time.
    pub fn issue(&self, identity: &Identity) -> Result<TokenPair, AuthError> {
        self.issue_at(identity, chrono::Utc::now().timestamp())
    }

    /// Issue a pair with `iat = now`.
    ///
    /// Each token gets its own random `jti`.
    #[instrument(skip_all)]
    pub fn issue_at(&self, identity: &Identity, now: i64) -> Result<TokenPair, AuthError> {
        let access = self.sign_one(identity, TokenType::Access, now, self.access_ttl_seconds)?;
        let refresh =
            self.sign_one(identity, TokenType::Refresh, now, self.refresh_ttl_seconds)?;

        tracing::debug!(
            target: "auth.token_issuer",
            access_exp = access.claims.exp,
            refresh_exp = refresh.claims.exp,
            "Issued token pair"
        );

        Ok(TokenPair { access, refresh })
    }

    fn sign_one(
        &self,
        identity: &Identity,
        token_type: TokenType,
        now: i64,
        ttl_seconds: i64,
    ) -> Result<IssuedToken, AuthError> {
        let claims = ClaimSet {
            sub: identity.user_uuid,
            jti: Uuid::new_v4(),
            iat: now,
            exp: now.saturating_add(ttl_seconds),
            token_type,
        };
        let token = self.codec.sign(&claims)?;
        Ok(IssuedToken { token, claims })
    }
}
