//! Team and membership repository.

use super::{is_unique_violation, store_error};
use crate::errors::AuthError;
use crate::models::{InviteStatus, Membership, Team};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Create a team and an `accepted` membership for its creator, atomically.
    /// `DuplicateTeam` if the name is taken.
    async fn create_team(
        &self,
        owner: Uuid,
        name: &str,
        description: Option<&str>,
        pool: i32,
    ) -> Result<Team, AuthError>;

    async fn find_team(&self, team_id: Uuid) -> Result<Option<Team>, AuthError>;

    /// Insert an `invited` membership. Existing memberships are left alone.
    /// Returns `true` if a row was inserted.
    async fn invite(&self, team_id: Uuid, user_id: Uuid) -> Result<bool, AuthError>;

    async fn find_membership(
        &self,
        user_id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<Membership>, AuthError>;

    /// Set the status of an existing membership. Returns `false` if there is none.
    async fn update_membership_status(
        &self,
        user_id: Uuid,
        team_id: Uuid,
        status: InviteStatus,
    ) -> Result<bool, AuthError>;
}

#[derive(sqlx::FromRow)]
struct MembershipRow {
    user_id: Uuid,
    team_id: Uuid,
    status: String,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = AuthError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<InviteStatus>().map_err(|_| {
            tracing::error!(
                target: "auth.repositories.teams",
                status = %row.status,
                "Unknown membership status in storage"
            );
            AuthError::Internal
        })?;

        Ok(Membership {
            user_id: row.user_id,
            team_id: row.team_id,
            status,
        })
    }
}

/// Postgres-backed [`TeamRepository`].
#[derive(Debug, Clone)]
pub struct PgTeamRepository {
    pool: PgPool,
}

impl PgTeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamRepository for PgTeamRepository {
    async fn create_team(
        &self,
        owner: Uuid,
        name: &str,
        description: Option<&str>,
        pool: i32,
    ) -> Result<Team, AuthError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("Failed to begin transaction", e))?;

        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (id, name, description, pool)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, pool, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(pool)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::DuplicateTeam
            } else {
                store_error("Failed to create team", e)
            }
        })?;

        sqlx::query(
            r#"
            INSERT INTO user_teams (id, user_id, team_id, status)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(team.id)
        .bind(InviteStatus::Accepted.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| store_error("Failed to add team owner", e))?;

        tx.commit()
            .await
            .map_err(|e| store_error("Failed to commit team creation", e))?;

        Ok(team)
    }

    async fn find_team(&self, team_id: Uuid) -> Result<Option<Team>, AuthError> {
        sqlx::query_as::<_, Team>(
            "SELECT id, name, description, pool, created_at FROM teams WHERE id = $1",
        )
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("Failed to fetch team", e))
    }

    async fn invite(&self, team_id: Uuid, user_id: Uuid) -> Result<bool, AuthError> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_teams (id, user_id, team_id, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, team_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(team_id)
        .bind(InviteStatus::Invited.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("Failed to invite user", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_membership(
        &self,
        user_id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<Membership>, AuthError> {
        let row = sqlx::query_as::<_, MembershipRow>(
            "SELECT user_id, team_id, status FROM user_teams WHERE user_id = $1 AND team_id = $2",
        )
        .bind(user_id)
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("Failed to fetch membership", e))?;

        row.map(Membership::try_from).transpose()
    }

    async fn update_membership_status(
        &self,
        user_id: Uuid,
        team_id: Uuid,
        status: InviteStatus,
    ) -> Result<bool, AuthError> {
        let result = sqlx::query(
            r#"
            UPDATE user_teams
            SET status = $3, updated_at = NOW()
            WHERE user_id = $1 AND team_id = $2
            "#,
        )
        .bind(user_id)
        .bind(team_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("Failed to update membership", e))?;

        Ok(result.rows_affected() > 0)
    }
}
