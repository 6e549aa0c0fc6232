//! User repository.
//!
//! Lookup by email and id plus insertion. Email uniqueness is enforced by the
//! `users.email` unique constraint; a violation comes back as
//! `AuthError::DuplicateEmail` even when it loses a race with a concurrent
//! registration.

use super::{is_unique_violation, store_error};
use crate::errors::AuthError;
use crate::models::{NewUser, User};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    async fn find_by_id(&self, user_uuid: Uuid) -> Result<Option<User>, AuthError>;

    /// Insert a user. `DuplicateEmail` if the email is taken.
    async fn create(&self, new_user: NewUser) -> Result<User, AuthError>;
}

/// Postgres-backed [`UserRepository`].
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT
                user_uuid, email, phone, firstname, middlename, lastname,
                password_hash, is_active, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("Failed to fetch user by email", e))
    }

    async fn find_by_id(&self, user_uuid: Uuid) -> Result<Option<User>, AuthError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT
                user_uuid, email, phone, firstname, middlename, lastname,
                password_hash, is_active, created_at, updated_at
            FROM users
            WHERE user_uuid = $1
            "#,
        )
        .bind(user_uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("Failed to fetch user by id", e))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AuthError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                user_uuid, email, phone, firstname, middlename, lastname, password_hash
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                user_uuid, email, phone, firstname, middlename, lastname,
                password_hash, is_active, created_at, updated_at
            "#,
        )
        .bind(new_user.user_uuid)
        .bind(&new_user.email)
        .bind(&new_user.phone)
        .bind(&new_user.firstname)
        .bind(&new_user.middlename)
        .bind(&new_user.lastname)
        .bind(&new_user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::DuplicateEmail
            } else {
                store_error("Failed to create user", e)
            }
        })
    }
}
