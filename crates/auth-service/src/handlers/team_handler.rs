//! Team endpoints. All require an access token.
//!
//! - `POST /auth/teams/create`
//! - `POST /auth/teams/:team_id/invite`
//! - `POST /auth/teams/respond`

use crate::errors::AuthError;
use crate::models::{
    CreateTeamRequest, CreateTeamResponse, InviteRequest, MessageResponse, RespondRequest,
};
use crate::routes::AppState;
use crate::services::team_service;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use common::jwt::ClaimSet;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// POST /auth/teams/create
#[instrument(skip_all, name = "auth.teams.create")]
pub async fn create_team(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
    Json(payload): Json<CreateTeamRequest>,
) -> Result<Json<CreateTeamResponse>, AuthError> {
    let team = team_service::create_team(state.teams.as_ref(), claims.sub, payload).await?;

    Ok(Json(CreateTeamResponse {
        team_id: team.id,
        name: team.name,
    }))
}

/// POST /auth/teams/:team_id/invite
#[instrument(skip_all, name = "auth.teams.invite", fields(team_id = %team_id))]
pub async fn invite(
    State(state): State<Arc<AppState>>,
    Path(team_id): Path<Uuid>,
    Extension(claims): Extension<ClaimSet>,
    Json(payload): Json<InviteRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    team_service::invite_user(
        state.teams.as_ref(),
        state.users.as_ref(),
        claims.sub,
        team_id,
        &payload.email,
    )
    .await?;

    Ok(Json(MessageResponse::new(format!(
        "User {} invited to team {}",
        payload.email.trim(),
        team_id
    ))))
}

/// POST /auth/teams/respond
#[instrument(skip_all, name = "auth.teams.respond")]
pub async fn respond(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
    Json(payload): Json<RespondRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let status = team_service::respond_to_invite(
        state.teams.as_ref(),
        claims.sub,
        payload.team_id,
        &payload.status,
    )
    .await?;

    Ok(Json(MessageResponse::new(format!(
        "Your invite to team {} was {}",
        payload.team_id, status
    ))))
}
