//! Revocation store.
//!
//! One row per revoked token id (`jti`) with the token's own expiry. The
//! primary key makes `add` idempotent under concurrent logouts. Rows whose
//! `expire` has passed are dead weight: the validator already rejects the
//! token as expired, and `delete_expired` prunes them.

use super::store_error;
use crate::errors::AuthError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait RevocationRepository: Send + Sync {
    /// Record `jti` as revoked until `expire`. Adding an id twice is a no-op.
    ///
    /// Returns `true` if a new entry was written.
    async fn add(&self, jti: Uuid, expire: DateTime<Utc>) -> Result<bool, AuthError>;

    /// Whether `jti` has been revoked. Always a fresh read.
    async fn contains(&self, jti: Uuid) -> Result<bool, AuthError>;

    /// Remove entries with `expire <= now`. Returns the number removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;

    /// Readiness probe.
    async fn health_check(&self) -> Result<(), AuthError>;
}

/// Postgres-backed [`RevocationRepository`].
#[derive(Debug, Clone)]
pub struct PgRevocationRepository {
    pool: PgPool,
}

impl PgRevocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevocationRepository for PgRevocationRepository {
    async fn add(&self, jti: Uuid, expire: DateTime<Utc>) -> Result<bool, AuthError> {
        let result = sqlx::query(
            r#"
            INSERT INTO revoked_tokens (id, expire)
            VALUES ($1, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(jti)
        .bind(expire)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("Failed to record revoked token", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn contains(&self, jti: Uuid) -> Result<bool, AuthError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE id = $1)")
                .bind(jti)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| store_error("Failed to check revoked token", e))?;

        Ok(exists)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expire <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Failed to prune revoked tokens", e))?;

        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> Result<(), AuthError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Revocation store health check failed", e))?;
        Ok(())
    }
}
