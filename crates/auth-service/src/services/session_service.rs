//! Login, logout and refresh: the session-level flows built on the token core.

use crate::errors::AuthError;
use crate::models::{TokenPair, User};
use crate::observability::metrics::{
    record_login_attempt, record_revocation, record_token_issuance,
};
use crate::repositories::{RevocationRepository, UserRepository};
use crate::services::refresh_rotator::RefreshRotator;
use crate::services::token_issuer::TokenIssuer;
use crate::services::user_service;
use common::jwt::ClaimSet;
use common::secret::SecretString;
use std::time::Instant;
use tracing::instrument;

/// Authenticate and issue a fresh token pair.
#[instrument(skip_all)]
pub async fn login(
    users: &dyn UserRepository,
    issuer: &TokenIssuer,
    email: &str,
    password: SecretString,
) -> Result<(User, TokenPair), AuthError> {
    let user = match user_service::authenticate(users, email, password).await {
        Ok(user) => user,
        Err(e) => {
            let outcome = match e {
                AuthError::BadCredentials | AuthError::InactiveAccount => e.reason(),
                _ => "error",
            };
            record_login_attempt(outcome);
            return Err(e);
        }
    };

    let start = Instant::now();
    let result = issuer.issue(&user.identity());
    let status = if result.is_ok() { "success" } else { "error" };
    record_token_issuance("login", status, start.elapsed());
    record_login_attempt(status);

    let pair = result?;
    tracing::info!(target: "auth.session", user_uuid = %user.user_uuid, "User logged in");
    Ok((user, pair))
}

/// Revoke the presented access token until its own expiry.
///
/// Logging out twice with the same token is not an error; the second call
/// never gets this far because validation already rejects the token as
/// revoked, and a racing duplicate is absorbed by the store.
#[instrument(skip_all)]
pub async fn logout(
    revocations: &dyn RevocationRepository,
    claims: &ClaimSet,
) -> Result<(), AuthError> {
    let expire = claims.expires_at().ok_or_else(|| {
        tracing::error!(target: "auth.session", exp = claims.exp, "Token expiry out of range");
        AuthError::Internal
    })?;

    match revocations.add(claims.jti, expire).await {
        Ok(true) => record_revocation("revoked"),
        Ok(false) => record_revocation("already_revoked"),
        Err(e) => {
            record_revocation("error");
            return Err(e);
        }
    }

    tracing::info!(target: "auth.session", user_uuid = %claims.sub, "User logged out");
    Ok(())
}

/// Exchange a refresh token for a new pair.
#[instrument(skip_all)]
pub async fn refresh(rotator: &RefreshRotator, raw_refresh: &str) -> Result<TokenPair, AuthError> {
    let start = Instant::now();
    let result = rotator.rotate(raw_refresh).await;
    let status = if result.is_ok() { "success" } else { "error" };
    record_token_issuance("refresh", status, start.elapsed());
    result
}
