//! Storage seams for the auth service.
//!
//! Each store is an async trait with a Postgres implementation and an
//! in-memory implementation used by tests and the test server harness.
//! Handlers and services only ever see `Arc<dyn ...Repository>`.

pub mod in_memory;
pub mod revoked_tokens;
pub mod teams;
pub mod users;

pub use in_memory::{InMemoryRevocationRepository, InMemoryTeamRepository, InMemoryUserRepository};
pub use revoked_tokens::{PgRevocationRepository, RevocationRepository};
pub use teams::{PgTeamRepository, TeamRepository};
pub use users::{PgUserRepository, UserRepository};

use crate::errors::AuthError;

/// Map a storage failure to the fail-closed error, keeping the detail for logs.
pub(crate) fn store_error(context: &str, err: sqlx::Error) -> AuthError {
    tracing::warn!(target: "auth.repositories", error = %err, "{}", context);
    AuthError::StoreUnavailable(format!("{}: {}", context, err))
}

/// True when the error is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
