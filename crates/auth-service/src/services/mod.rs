//! Business logic layer.
//!
//! - `token_issuer`, `token_validator`, `refresh_rotator` - the token lifecycle core
//! - `user_service` - registration, authentication, profile lookup
//! - `session_service` - login, logout, refresh flows
//! - `team_service` - teams and membership invitations

pub mod refresh_rotator;
pub mod session_service;
pub mod team_service;
pub mod token_issuer;
pub mod token_validator;
pub mod user_service;

pub use refresh_rotator::RefreshRotator;
pub use token_issuer::TokenIssuer;
pub use token_validator::TokenValidator;
