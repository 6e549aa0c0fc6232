//! Deterministic cryptographic fixtures for testing
//!
//! Every harness-spawned server signs with [`test_jwt_secret`], so tests can
//! forge tokens the server accepts, and with [`foreign_jwt_secret`] to forge
//! ones it must reject.

use auth_service::config::{
    Config, DEFAULT_ACCESS_TOKEN_TTL_SECONDS, DEFAULT_REFRESH_TOKEN_TTL_SECONDS, MIN_BCRYPT_COST,
};
use base64::engine::general_purpose;
use base64::Engine;
use common::secret::SecretBox;

/// Deterministic 32-byte secret derived from `seed`.
pub fn test_secret_from_seed(seed: u8) -> Vec<u8> {
    (0u8..32)
        .map(|i| seed.wrapping_mul(31).wrapping_add(i.wrapping_mul(7)))
        .collect()
}

/// The secret harness servers sign with.
pub fn test_jwt_secret() -> Vec<u8> {
    test_secret_from_seed(1)
}

/// A valid-length secret no harness server uses.
pub fn foreign_jwt_secret() -> Vec<u8> {
    test_secret_from_seed(2)
}

/// [`test_jwt_secret`] encoded as `AUTH_JWT_SECRET` expects it.
pub fn test_jwt_secret_b64() -> String {
    general_purpose::STANDARD.encode(test_jwt_secret())
}

/// Service configuration for tests.
///
/// Cheapest allowed bcrypt cost, sweep disabled, and non-`Secure` cookies so
/// plain-http test clients can echo them back.
pub fn test_config() -> Config {
    Config {
        database_url: String::new(), // Not used; the harness hands over the pool
        bind_address: "127.0.0.1:0".to_string(),
        jwt_secret: SecretBox::new(Box::new(test_jwt_secret())),
        access_token_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
        refresh_token_ttl_seconds: DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
        bcrypt_cost: MIN_BCRYPT_COST,
        secure_cookies: false,
        cors_origins: Vec::new(),
        revocation_sweep_interval_seconds: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_service::config::MIN_JWT_SECRET_BYTES;
    use common::secret::ExposeSecret;

    #[test]
    fn test_secret_is_deterministic() {
        assert_eq!(test_secret_from_seed(5), test_secret_from_seed(5));
        assert_ne!(test_jwt_secret(), foreign_jwt_secret());
    }

    #[test]
    fn test_secret_meets_minimum_length() {
        assert_eq!(test_jwt_secret().len(), MIN_JWT_SECRET_BYTES);
    }

    #[test]
    fn test_config_round_trips_through_env_parsing() {
        let vars = std::collections::HashMap::from([
            ("DATABASE_URL".to_string(), "postgresql://x".to_string()),
            ("AUTH_JWT_SECRET".to_string(), test_jwt_secret_b64()),
        ]);
        let parsed = Config::from_vars(&vars).unwrap();
        assert_eq!(parsed.jwt_secret.expose_secret(), &test_jwt_secret());
    }
}
