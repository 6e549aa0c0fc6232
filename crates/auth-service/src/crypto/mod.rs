//! Token signing and password hashing.
//!
//! [`TokenCodec`] turns a [`ClaimSet`] into a compact HS256 JWS and back. It
//! checks structure and integrity only: expiry and revocation are the
//! validator's job, so an expired but authentic token still verifies here.

use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST, MIN_JWT_SECRET_BYTES};
use crate::errors::AuthError;
use common::jwt::{check_token_size, ClaimSet};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::collections::HashSet;
use std::fmt;
use tracing::instrument;

/// Bcrypt hash of a random string, verified against when the email is
/// unknown so both login failure paths cost one bcrypt verification.
pub const DUMMY_PASSWORD_HASH: &str =
    "$2b$12$LQv3c1yqBWVHxkd0LHAkCOYz6TtxMQJqhN8/LewY5GyYqExt7YD3a";

/// Stateless HS256 signer/verifier for Slate tokens.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &"HS256")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl TokenCodec {
    /// Build a codec from the shared signing secret.
    ///
    /// # Errors
    ///
    /// `AuthError::Crypto` if the secret is shorter than 32 bytes.
    pub fn new(secret: &[u8]) -> Result<Self, AuthError> {
        if secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(AuthError::Crypto(format!(
                "Signing secret must be at least {} bytes, got {}",
                MIN_JWT_SECRET_BYTES,
                secret.len()
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by the validator against an explicit clock.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims = HashSet::new();
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Sign a claim set.
    #[instrument(skip_all)]
    pub fn sign(&self, claims: &ClaimSet) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Crypto(format!("Token signing failed: {}", e)))
    }

    /// Verify integrity and decode the claim set.
    ///
    /// Fails with `MalformedToken` when the input is oversized, is not a
    /// compact JWS, or carries an incomplete claim set, and with
    /// `InvalidSignature` when the signature or algorithm does not match.
    #[instrument(skip_all)]
    pub fn verify(&self, token: &str) -> Result<ClaimSet, AuthError> {
        check_token_size(token).map_err(|_| AuthError::MalformedToken)?;

        let token_data =
            decode::<ClaimSet>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::debug!(target: "auth.crypto", error = %e, "Token verification failed");
                match e.kind() {
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        AuthError::InvalidSignature
                    }
                    _ => AuthError::MalformedToken,
                }
            })?;

        Ok(token_data.claims)
    }
}

/// Hash a password with bcrypt.
#[instrument(skip_all)]
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(AuthError::Crypto(format!(
            "Invalid bcrypt cost: {} (must be {}-{})",
            cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
        )));
    }

    bcrypt::hash(password, cost)
        .map_err(|e| AuthError::Crypto(format!("Password hashing failed: {}", e)))
}

/// Check a password against a bcrypt hash.
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash)
        .map_err(|e| AuthError::Crypto(format!("Password verification failed: {}", e)))
}
