//! Where tokens travel on the wire.
//!
//! - access tokens: `Authorization: Bearer <token>` request header
//! - refresh tokens: `refresh` cookie, `HttpOnly`, scoped to `/auth`, expiring
//!   with the token itself
//!
//! Nothing here keeps server-side session state.

use crate::errors::AuthError;
use crate::models::IssuedToken;
use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::OffsetDateTime;

pub const REFRESH_COOKIE_NAME: &str = "refresh";
pub const REFRESH_COOKIE_PATH: &str = "/auth";

/// Extract the bearer token from the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(target: "auth.transport", "Missing Authorization header");
            AuthError::MissingBearerToken
        })?;

    match auth_header.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => {
            tracing::debug!(target: "auth.transport", "Invalid Authorization header format");
            Err(AuthError::MissingBearerToken)
        }
    }
}

/// Build the refresh cookie for a freshly issued refresh token.
pub fn refresh_cookie(refresh: &IssuedToken, secure: bool) -> Cookie<'static> {
    let mut builder = Cookie::build((REFRESH_COOKIE_NAME, refresh.token.clone()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path(REFRESH_COOKIE_PATH);

    match OffsetDateTime::from_unix_timestamp(refresh.claims.exp) {
        Ok(expires) => builder = builder.expires(expires),
        Err(e) => {
            // Falls back to a session cookie; the token still carries its own exp.
            tracing::warn!(target: "auth.transport", error = %e, "Refresh expiry out of range");
        }
    }

    builder.build()
}

/// Read the refresh token from the request cookies.
pub fn refresh_token_from(jar: &CookieJar) -> Result<String, AuthError> {
    jar.get(REFRESH_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingRefreshToken)
}
