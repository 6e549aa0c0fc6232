//! HTTP middleware layers.
//!
//! - `auth` - access token validation for protected routes
//! - `http_metrics` - request metrics for every response

pub mod auth;
pub mod http_metrics;

pub use auth::require_access_token;
pub use http_metrics::http_metrics_middleware;
