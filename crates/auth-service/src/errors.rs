use crate::observability::metrics::record_error;
use crate::observability::ErrorCategory;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Generic message for every bearer/refresh token rejection.
const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid or expired";

#[derive(Debug, Error)]
pub enum AuthError {
    // Token rejections. All map to 401 with one generic message; the variant
    // is kept for logs and metrics.
    #[error("Token is malformed")]
    MalformedToken,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token type does not match the endpoint")]
    WrongTokenType,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Token has been revoked")]
    RevokedToken,

    #[error("Missing bearer token")]
    MissingBearerToken,

    #[error("Refresh token required")]
    MissingRefreshToken,

    #[error("Email has already been registered")]
    DuplicateEmail,

    #[error("Incorrect email or password")]
    BadCredentials,

    #[error("Account is inactive")]
    InactiveAccount,

    #[error("Invalid invitation status: {0}")]
    InvalidStatus(String),

    #[error("Team name is already taken")]
    DuplicateTeam,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Team not found")]
    TeamNotFound,

    #[error("Invitation not found")]
    InvitationNotFound,

    /// Backing store could not answer. Requests fail closed.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal server error")]
    Internal,
}

impl AuthError {
    /// True for the variants produced by token validation.
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::MalformedToken
                | AuthError::InvalidSignature
                | AuthError::WrongTokenType
                | AuthError::ExpiredToken
                | AuthError::RevokedToken
                | AuthError::MissingBearerToken
        )
    }

    /// Short stable label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MalformedToken => "malformed",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::WrongTokenType => "wrong_type",
            AuthError::ExpiredToken => "expired",
            AuthError::RevokedToken => "revoked",
            AuthError::MissingBearerToken => "missing_bearer",
            AuthError::MissingRefreshToken => "missing_refresh",
            AuthError::DuplicateEmail => "duplicate_email",
            AuthError::BadCredentials => "bad_credentials",
            AuthError::InactiveAccount => "inactive_account",
            AuthError::InvalidStatus(_) => "invalid_status",
            AuthError::DuplicateTeam => "duplicate_team",
            AuthError::Validation(_) => "validation",
            AuthError::UserNotFound => "user_not_found",
            AuthError::TeamNotFound => "team_not_found",
            AuthError::InvitationNotFound => "invitation_not_found",
            AuthError::StoreUnavailable(_) => "store_unavailable",
            AuthError::Crypto(_) => "crypto",
            AuthError::Internal => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::WrongTokenType
            | AuthError::ExpiredToken
            | AuthError::RevokedToken
            | AuthError::MissingBearerToken => StatusCode::UNAUTHORIZED,
            AuthError::MissingRefreshToken
            | AuthError::DuplicateEmail
            | AuthError::BadCredentials
            | AuthError::InvalidStatus(_)
            | AuthError::DuplicateTeam
            | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::InactiveAccount => StatusCode::FORBIDDEN,
            AuthError::UserNotFound | AuthError::TeamNotFound | AuthError::InvitationNotFound => {
                StatusCode::NOT_FOUND
            }
            AuthError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Crypto(_) | AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match &self {
            AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::WrongTokenType
            | AuthError::ExpiredToken
            | AuthError::RevokedToken
            | AuthError::MissingBearerToken => ("INVALID_TOKEN", INVALID_TOKEN_MESSAGE.to_string()),
            AuthError::MissingRefreshToken => (
                "REFRESH_TOKEN_REQUIRED",
                "Refresh token required".to_string(),
            ),
            AuthError::DuplicateEmail => (
                "EMAIL_ALREADY_REGISTERED",
                "Email has already been registered".to_string(),
            ),
            AuthError::BadCredentials => (
                "INVALID_CREDENTIALS",
                "Incorrect email or password".to_string(),
            ),
            AuthError::InactiveAccount => ("ACCOUNT_INACTIVE", "Account is inactive".to_string()),
            AuthError::InvalidStatus(status) => (
                "INVALID_STATUS",
                format!("Invalid invitation status: {}", status),
            ),
            AuthError::DuplicateTeam => (
                "TEAM_ALREADY_EXISTS",
                "Team name is already taken".to_string(),
            ),
            AuthError::Validation(reason) => ("VALIDATION_ERROR", reason.clone()),
            AuthError::UserNotFound => ("USER_NOT_FOUND", "User not found".to_string()),
            AuthError::TeamNotFound => ("TEAM_NOT_FOUND", "Team not found".to_string()),
            AuthError::InvitationNotFound => (
                "INVITATION_NOT_FOUND",
                "Invitation not found".to_string(),
            ),
            AuthError::StoreUnavailable(_) => (
                "STORE_UNAVAILABLE",
                "Service temporarily unavailable".to_string(),
            ),
            AuthError::Crypto(_) => (
                "CRYPTO_ERROR",
                "An internal cryptographic error occurred".to_string(),
            ),
            AuthError::Internal => ("INTERNAL_ERROR", "An internal error occurred".to_string()),
        };

        record_error(
            self.reason(),
            ErrorCategory::from(&self).as_str(),
            status.as_u16(),
        );

        if status.is_server_error() {
            tracing::error!(target: "auth.errors", error = %self, "Request failed");
        }

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}
