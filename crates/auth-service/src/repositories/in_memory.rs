//! In-memory repositories.
//!
//! Same contracts as the Postgres implementations, backed by maps behind a
//! `tokio::sync::RwLock`. Used by unit tests and by the test server harness
//! when no database is available.

use super::{RevocationRepository, TeamRepository, UserRepository};
use crate::errors::AuthError;
use crate::models::{InviteStatus, Membership, NewUser, Team, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip `is_active` for an existing user. Returns `false` if unknown.
    pub async fn set_active(&self, user_uuid: Uuid, is_active: bool) -> bool {
        match self.users.write().await.get_mut(&user_uuid) {
            Some(user) => {
                user.is_active = is_active;
                true
            }
            None => false,
        }
    }

    /// Drop a user, as if deleted out from under a live token.
    pub async fn remove(&self, user_uuid: Uuid) -> bool {
        self.users.write().await.remove(&user_uuid).is_some()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, user_uuid: Uuid) -> Result<Option<User>, AuthError> {
        Ok(self.users.read().await.get(&user_uuid).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AuthError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == new_user.email) {
            return Err(AuthError::DuplicateEmail);
        }

        let now = Utc::now();
        let user = User {
            user_uuid: new_user.user_uuid,
            email: new_user.email,
            phone: new_user.phone,
            firstname: new_user.firstname,
            middlename: new_user.middlename,
            lastname: new_user.lastname,
            password_hash: new_user.password_hash,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.user_uuid, user.clone());
        Ok(user)
    }
}

// ============================================================================
// Revocations
// ============================================================================

/// In-memory revocation set.
///
/// `set_failing(true)` makes every call return `StoreUnavailable`, which is
/// how tests exercise fail-closed validation.
#[derive(Debug, Default)]
pub struct InMemoryRevocationRepository {
    entries: RwLock<HashMap<Uuid, DateTime<Utc>>>,
    failing: AtomicBool,
    lookups: AtomicUsize,
}

impl InMemoryRevocationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that fails every call.
    pub fn failing() -> Self {
        let repo = Self::default();
        repo.set_failing(true);
        repo
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `contains` calls served so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), AuthError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuthError::StoreUnavailable(
                "in-memory revocation store set to fail".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RevocationRepository for InMemoryRevocationRepository {
    async fn add(&self, jti: Uuid, expire: DateTime<Utc>) -> Result<bool, AuthError> {
        self.check_available()?;
        let mut entries = self.entries.write().await;
        if entries.contains_key(&jti) {
            return Ok(false);
        }
        entries.insert(jti, expire);
        Ok(true)
    }

    async fn contains(&self, jti: Uuid) -> Result<bool, AuthError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.entries.read().await.contains_key(&jti))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        self.check_available()?;
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, expire| *expire > now);
        Ok((before - entries.len()) as u64)
    }

    async fn health_check(&self) -> Result<(), AuthError> {
        self.check_available()
    }
}

// ============================================================================
// Teams
// ============================================================================

#[derive(Debug, Default)]
struct TeamState {
    teams: HashMap<Uuid, Team>,
    memberships: HashMap<(Uuid, Uuid), InviteStatus>,
}

#[derive(Debug, Default)]
pub struct InMemoryTeamRepository {
    state: RwLock<TeamState>,
}

impl InMemoryTeamRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn create_team(
        &self,
        owner: Uuid,
        name: &str,
        description: Option<&str>,
        pool: i32,
    ) -> Result<Team, AuthError> {
        let mut state = self.state.write().await;
        if state.teams.values().any(|t| t.name == name) {
            return Err(AuthError::DuplicateTeam);
        }

        let team = Team {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.map(ToString::to_string),
            pool,
            created_at: Utc::now(),
        };
        state.teams.insert(team.id, team.clone());
        state
            .memberships
            .insert((owner, team.id), InviteStatus::Accepted);
        Ok(team)
    }

    async fn find_team(&self, team_id: Uuid) -> Result<Option<Team>, AuthError> {
        Ok(self.state.read().await.teams.get(&team_id).cloned())
    }

    async fn invite(&self, team_id: Uuid, user_id: Uuid) -> Result<bool, AuthError> {
        let mut state = self.state.write().await;
        if state.memberships.contains_key(&(user_id, team_id)) {
            return Ok(false);
        }
        state
            .memberships
            .insert((user_id, team_id), InviteStatus::Invited);
        Ok(true)
    }

    async fn find_membership(
        &self,
        user_id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<Membership>, AuthError> {
        Ok(self
            .state
            .read()
            .await
            .memberships
            .get(&(user_id, team_id))
            .map(|status| Membership {
                user_id,
                team_id,
                status: *status,
            }))
    }

    async fn update_membership_status(
        &self,
        user_id: Uuid,
        team_id: Uuid,
        status: InviteStatus,
    ) -> Result<bool, AuthError> {
        match self
            .state
            .write()
            .await
            .memberships
            .get_mut(&(user_id, team_id))
        {
            Some(current) => {
                *current = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
