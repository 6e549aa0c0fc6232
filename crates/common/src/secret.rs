//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate. Use these types for
//! passwords, signing keys and raw bearer tokens anywhere they are held longer
//! than a single function call.
//!
//! `SecretBox<T>` and `SecretString` implement `Debug` with redaction, so a
//! struct that derives `Debug` while holding a secret stays safe to log via
//! `{:?}` or `tracing`. Secrets are zeroized when dropped.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct LoginForm {
//!     email: String,
//!     password: SecretString,
//! }
//!
//! let form = LoginForm {
//!     email: "a@b.com".to_string(),
//!     password: SecretString::from("p1"),
//! };
//!
//! assert!(!format!("{form:?}").contains("p1\""));
//! let password: &str = form.password.expose_secret();
//! assert_eq!(password, "p1");
//! ```
//!
//! # Usage in Slate
//!
//! - `SecretString` for user passwords arriving in request bodies
//! - `SecretBox<Vec<u8>>` for the token signing key loaded from configuration
//!
//! With the `serde` feature enabled (the workspace default), secrets can be
//! deserialized straight out of JSON request bodies.

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
