//! Account and session endpoints.
//!
//! - `POST /auth/register` - create an account (public)
//! - `POST /auth/login` - exchange credentials for a token pair (public)
//! - `GET /auth/refresh` - exchange the refresh cookie for a new pair (public)
//! - `POST /auth/logout` - revoke the presented access token (authenticated)
//! - `GET /auth/me` - profile of the token's subject (authenticated)
//!
//! The access token goes back in the JSON body. The refresh token only ever
//! travels in the `refresh` cookie.

use crate::errors::AuthError;
use crate::models::{
    LoginRequest, LoginResponse, MessageResponse, RefreshResponse, RegisterRequest, UserProfile,
};
use crate::routes::AppState;
use crate::services::{session_service, user_service};
use crate::transport::{refresh_cookie, refresh_token_from};
use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use common::jwt::ClaimSet;
use std::sync::Arc;
use tracing::instrument;

/// Handle registration.
///
/// POST /auth/register
#[instrument(skip_all, name = "auth.register")]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>), AuthError> {
    let profile =
        user_service::register_user(state.users.as_ref(), state.config.bcrypt_cost, payload)
            .await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Handle login.
///
/// POST /auth/login
#[instrument(skip_all, name = "auth.login")]
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AuthError> {
    let (user, pair) = session_service::login(
        state.users.as_ref(),
        &state.issuer,
        &payload.email,
        payload.password,
    )
    .await?;

    let jar = jar.add(refresh_cookie(&pair.refresh, state.config.secure_cookies));

    Ok((
        jar,
        Json(LoginResponse {
            access_token: pair.access.token,
            email: user.email,
        }),
    ))
}

/// Handle refresh.
///
/// GET /auth/refresh
///
/// A rejected refresh token leaves the client's cookie untouched: the error
/// response carries no `Set-Cookie`.
#[instrument(skip_all, name = "auth.refresh")]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<RefreshResponse>), AuthError> {
    let raw = refresh_token_from(&jar)?;

    let pair = session_service::refresh(&state.rotator, &raw).await?;

    let jar = jar.add(refresh_cookie(&pair.refresh, state.config.secure_cookies));

    Ok((
        jar,
        Json(RefreshResponse {
            access_token: pair.access.token,
        }),
    ))
}

/// Handle logout.
///
/// POST /auth/logout
#[instrument(skip_all, name = "auth.logout")]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
) -> Result<Json<MessageResponse>, AuthError> {
    session_service::logout(state.revocations.as_ref(), &claims).await?;

    Ok(Json(MessageResponse::new("Successfully logged out")))
}

/// Handle current-user lookup.
///
/// GET /auth/me
#[instrument(skip_all, name = "auth.me")]
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
) -> Result<Json<UserProfile>, AuthError> {
    let profile = user_service::current_user(state.users.as_ref(), &claims).await?;
    Ok(Json(profile))
}
