//! # Auth Test Utilities
//!
//! Shared test utilities for the auth service.
//!
//! This crate provides:
//! - Deterministic crypto fixtures (fixed signing secret, test config)
//! - Test data builders (`TestTokenBuilder` for hand-made tokens)
//! - Server test harness (`TestAuthServer` for E2E tests)
//! - Fixed test IDs (UUIDs, emails)
//! - Custom assertions (`TokenAssertions` trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auth_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestAuthServer::spawn().await?;
//!
//!     // Forge an expired refresh token with the server's secret
//!     let token = TestTokenBuilder::new()
//!         .for_user(TEST_USER_ALICE)
//!         .refresh()
//!         .expired_seconds_ago(60)
//!         .sign(&test_jwt_secret());
//!
//!     token.assert_valid_jwt().assert_for_subject(TEST_USER_ALICE);
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod server_harness;
pub mod test_ids;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use server_harness::*;
pub use test_ids::*;
pub use token_builders::*;
