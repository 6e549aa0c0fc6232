use crate::errors::AuthError;
use chrono::{DateTime, Utc};
use common::jwt::ClaimSet;
use common::secret::SecretString;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Who a token pair is issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_uuid: Uuid,
    pub email: String,
}

/// A signed token together with the claims it carries.
#[derive(Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: ClaimSet,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[REDACTED]")
            .field("claims", &self.claims)
            .finish()
    }
}

/// Access and refresh tokens produced together at login or refresh.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// User model (maps to users table)
#[derive(Clone, FromRow)]
pub struct User {
    pub user_uuid: Uuid,
    pub email: String,
    pub phone: Option<String>,
    pub firstname: Option<String>,
    pub middlename: Option<String>,
    pub lastname: Option<String>,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("user_uuid", &self.user_uuid)
            .field("email", &"[REDACTED]")
            .field("password_hash", &"[REDACTED]")
            .field("is_active", &self.is_active)
            .finish_non_exhaustive()
    }
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity {
            user_uuid: self.user_uuid,
            email: self.email.clone(),
        }
    }
}

/// Fields for a user row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_uuid: Uuid,
    pub email: String,
    pub phone: Option<String>,
    pub firstname: Option<String>,
    pub middlename: Option<String>,
    pub lastname: Option<String>,
    pub password_hash: String,
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_uuid: Uuid,
    pub email: String,
    pub phone: Option<String>,
    pub firstname: Option<String>,
    pub middlename: Option<String>,
    pub lastname: Option<String>,
    pub is_active: bool,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            user_uuid: user.user_uuid,
            email: user.email.clone(),
            phone: user.phone.clone(),
            firstname: user.firstname.clone(),
            middlename: user.middlename.clone(),
            lastname: user.lastname.clone(),
            is_active: user.is_active,
        }
    }
}

/// Team model (maps to teams table)
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub pool: i32,
    pub created_at: DateTime<Utc>,
}

/// Membership state of a user in a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Invited,
    Accepted,
    Rejected,
}

impl InviteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteStatus::Invited => "invited",
            InviteStatus::Accepted => "accepted",
            InviteStatus::Rejected => "rejected",
        }
    }

    /// Statuses a user may answer an invitation with.
    pub fn is_response(&self) -> bool {
        matches!(self, InviteStatus::Accepted | InviteStatus::Rejected)
    }
}

impl fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InviteStatus {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invited" => Ok(InviteStatus::Invited),
            "accepted" => Ok(InviteStatus::Accepted),
            "rejected" => Ok(InviteStatus::Rejected),
            other => Err(AuthError::InvalidStatus(other.to_string())),
        }
    }
}

/// Team membership row (maps to user_teams table)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub user_id: Uuid,
    pub team_id: Uuid,
    pub status: InviteStatus,
}

// ============================================================================
// Request / response bodies
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: SecretString,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub middlename: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pool: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTeamResponse {
    pub team_id: Uuid,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub email: String,
}

/// `status` stays a string so unknown values reach `InviteStatus::from_str`
/// and come back as a 400 with the same error body as every other failure.
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub team_id: Uuid,
    pub status: String,
}

/// Readiness probe response.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
