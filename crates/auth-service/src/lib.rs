//! Auth Service Library
//!
//! Token lifecycle for user sessions: short-lived access tokens presented as
//! bearer credentials, long-lived refresh tokens carried in an `HttpOnly`
//! cookie, and server-side revocation of access tokens on logout.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - Token signing/verification and password hashing
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - Access-token guard and HTTP metrics
//! - `models` - Data models
//! - `observability` - Metrics and log-safe helpers
//! - `repositories` - Storage layer (users, revocations, teams)
//! - `routes` - Router and application state
//! - `services` - Business logic layer
//! - `tasks` - Background maintenance
//! - `transport` - Where tokens travel on the wire

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod tasks;
pub mod transport;
