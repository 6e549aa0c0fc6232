//! Common utilities and types shared across Slate components.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for the bearer credential contract (claims, token types, size limits)
pub mod jwt;
