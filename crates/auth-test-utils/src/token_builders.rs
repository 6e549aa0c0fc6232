//! Builder patterns for test data construction
//!
//! [`TestTokenBuilder`] produces tokens the service would never issue on its
//! own: already expired, of the wrong type, with a chosen `jti`, or signed
//! with a foreign secret.

use chrono::Utc;
use common::jwt::{ClaimSet, TokenType};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use uuid::Uuid;

/// Builder for test tokens.
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_user(TEST_USER_ALICE)
///     .refresh()
///     .expires_in(3600)
///     .sign(&test_jwt_secret());
/// ```
pub struct TestTokenBuilder {
    sub: Uuid,
    jti: Uuid,
    iat: i64,
    exp: i64,
    token_type: TokenType,
}

impl TestTokenBuilder {
    /// Access token for a random subject, valid for an hour.
    pub fn new() -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: Uuid::new_v4(),
            jti: Uuid::new_v4(),
            iat: now,
            exp: now + 3600,
            token_type: TokenType::Access,
        }
    }

    pub fn for_user(mut self, sub: Uuid) -> Self {
        self.sub = sub;
        self
    }

    pub fn with_jti(mut self, jti: Uuid) -> Self {
        self.jti = jti;
        self
    }

    pub fn with_type(mut self, token_type: TokenType) -> Self {
        self.token_type = token_type;
        self
    }

    pub fn refresh(self) -> Self {
        self.with_type(TokenType::Refresh)
    }

    /// Set expiration in seconds from now
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = Utc::now().timestamp() + seconds;
        self
    }

    /// Set expiration in the past; `iat` moves back with it.
    pub fn expired_seconds_ago(mut self, seconds: i64) -> Self {
        self.exp = Utc::now().timestamp() - seconds;
        self.iat = self.exp - 3600;
        self
    }

    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self
    }

    pub fn build(self) -> ClaimSet {
        ClaimSet {
            sub: self.sub,
            jti: self.jti,
            iat: self.iat,
            exp: self.exp,
            token_type: self.token_type,
        }
    }

    /// Sign as HS256 with `secret`.
    pub fn sign(self, secret: &[u8]) -> String {
        sign_claims(&self.build(), secret)
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Sign arbitrary claims as HS256.
pub fn sign_claims<T: serde::Serialize>(claims: &T, secret: &[u8]) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .expect("HS256 signing with an in-memory key cannot fail")
}
