//! Authentication middleware for protected routes.
//!
//! Extracts the bearer token, validates it as an access token, and injects the
//! resulting [`ClaimSet`](common::jwt::ClaimSet) into request extensions for
//! handlers.

use crate::errors::AuthError;
use crate::routes::AppState;
use crate::transport::bearer_token;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use common::jwt::TokenType;
use std::sync::Arc;
use tracing::instrument;

/// Require a valid, unrevoked access token.
///
/// # Response
///
/// - 401 if the token is missing, malformed, forged, expired, revoked, or a
///   refresh token
/// - 503 if the revocation store cannot be reached
/// - otherwise continues with `ClaimSet` in extensions
#[instrument(skip_all, name = "auth.middleware.access_token")]
pub async fn require_access_token(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AuthError> {
    let token = bearer_token(req.headers())?;

    let claims = state
        .validator
        .validate(token, TokenType::Access)
        .await
        .map_err(|e| {
            if !e.is_token_rejection() {
                tracing::warn!(target: "auth.middleware", error = %e, "Access token check failed");
            }
            e
        })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
