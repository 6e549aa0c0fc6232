//! Team creation and membership invitations.

use crate::errors::AuthError;
use crate::models::{CreateTeamRequest, InviteStatus, Team};
use crate::observability::hash_for_correlation;
use crate::repositories::{TeamRepository, UserRepository};
use crate::services::user_service::normalize_email;
use tracing::instrument;
use uuid::Uuid;

pub const DEFAULT_TEAM_POOL: i32 = 2;
const MAX_TEAM_NAME_CHARS: usize = 255;

/// Create a team owned by `owner`, who becomes its first accepted member.
#[instrument(skip_all)]
pub async fn create_team(
    teams: &dyn TeamRepository,
    owner: Uuid,
    request: CreateTeamRequest,
) -> Result<Team, AuthError> {
    let name = request.name.trim();
    if name.is_empty() || name.chars().count() > MAX_TEAM_NAME_CHARS {
        return Err(AuthError::Validation(format!(
            "Team name must be 1-{} characters",
            MAX_TEAM_NAME_CHARS
        )));
    }

    let pool = request.pool.unwrap_or(DEFAULT_TEAM_POOL);
    if pool < 1 {
        return Err(AuthError::Validation(
            "Team pool must be at least 1".to_string(),
        ));
    }

    let description = request
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let team = teams.create_team(owner, name, description, pool).await?;

    tracing::info!(
        target: "auth.team_service",
        team_id = %team.id,
        owner = %owner,
        "Team created"
    );

    Ok(team)
}

/// Invite the user registered under `email` to `team_id`.
///
/// Only accepted members may invite. Re-inviting someone who already has a
/// membership row, in any state, leaves that row untouched.
#[instrument(skip_all)]
pub async fn invite_user(
    teams: &dyn TeamRepository,
    users: &dyn UserRepository,
    inviter: Uuid,
    team_id: Uuid,
    email: &str,
) -> Result<(), AuthError> {
    if teams.find_team(team_id).await?.is_none() {
        return Err(AuthError::TeamNotFound);
    }

    let inviter_is_member = teams
        .find_membership(inviter, team_id)
        .await?
        .is_some_and(|m| m.status == InviteStatus::Accepted);
    if !inviter_is_member {
        // Same answer as a missing team so membership is not probeable.
        return Err(AuthError::TeamNotFound);
    }

    let email = normalize_email(email);
    let invitee = users
        .find_by_email(&email)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let inserted = teams.invite(team_id, invitee.user_uuid).await?;

    tracing::info!(
        target: "auth.team_service",
        team_id = %team_id,
        invitee_hash = %hash_for_correlation(&email),
        inserted,
        "Team invitation processed"
    );

    Ok(())
}

/// Answer an invitation with `accepted` or `rejected`.
///
/// The status string is parsed before anything touches storage; unknown
/// values and `invited` are `InvalidStatus`.
#[instrument(skip_all)]
pub async fn respond_to_invite(
    teams: &dyn TeamRepository,
    user_id: Uuid,
    team_id: Uuid,
    status: &str,
) -> Result<InviteStatus, AuthError> {
    let status: InviteStatus = status.parse()?;
    if !status.is_response() {
        return Err(AuthError::InvalidStatus(status.to_string()));
    }

    if !teams
        .update_membership_status(user_id, team_id, status)
        .await?
    {
        return Err(AuthError::InvitationNotFound);
    }

    tracing::info!(
        target: "auth.team_service",
        team_id = %team_id,
        user_id = %user_id,
        status = %status,
        "Invitation answered"
    );

    Ok(status)
}
