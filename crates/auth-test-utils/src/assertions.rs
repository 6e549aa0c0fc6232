//! Custom test assertions for expressive tests
//!
//! Reads claims without verifying the signature; use the service's validator
//! when acceptance itself is under test.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use common::jwt::{decode_claims_unverified, ClaimSet, TokenType};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

/// Custom assertions on a compact JWT string.
///
/// # Example
/// ```rust,ignore
/// body.access_token
///     .assert_valid_jwt()
///     .assert_token_type(TokenType::Access)
///     .assert_expires_in(900);
/// ```
pub trait TokenAssertions {
    /// Assert three segments, an HS256 JWT header, and a well-formed claim set
    fn assert_valid_jwt(&self) -> &Self;

    fn assert_token_type(&self, token_type: TokenType) -> &Self;

    fn assert_for_subject(&self, subject: Uuid) -> &Self;

    /// Assert that the token expires within `seconds` from now (5s tolerance)
    fn assert_expires_in(&self, seconds: i64) -> &Self;
}

fn claims_of(token: &str) -> ClaimSet {
    decode_claims_unverified(token).expect("Failed to decode JWT claims")
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts.len()
        );

        let header = URL_SAFE_NO_PAD
            .decode(parts[0])
            .expect("Failed to base64 decode JWT header");
        let header: JwtHeader =
            serde_json::from_slice(&header).expect("Failed to parse JWT header JSON");
        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");

        claims_of(self);
        self
    }

    fn assert_token_type(&self, token_type: TokenType) -> &Self {
        let claims = claims_of(self);
        assert_eq!(
            claims.token_type, token_type,
            "Expected {} token, got {}",
            token_type, claims.token_type
        );
        self
    }

    fn assert_for_subject(&self, subject: Uuid) -> &Self {
        let claims = claims_of(self);
        assert_eq!(claims.sub, subject, "Token subject mismatch");
        self
    }

    fn assert_expires_in(&self, seconds: i64) -> &Self {
        let claims = claims_of(self);
        let expires_in = claims.exp - chrono::Utc::now().timestamp();

        assert!(
            (expires_in - seconds).abs() <= 5,
            "Token expires in {}s, expected ~{}s",
            expires_in,
            seconds
        );
        self
    }
}
