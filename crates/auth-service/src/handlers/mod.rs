//! HTTP request handlers for the auth service.

pub mod auth_handler;
pub mod health;
pub mod metrics;
pub mod team_handler;

pub use auth_handler::{login, logout, me, refresh, register};
pub use health::{health_check, readiness_check};
pub use metrics::metrics_handler;
pub use team_handler::{create_team, invite, respond};
