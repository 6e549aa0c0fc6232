//! User service module for registration, authentication and profile lookup.

use crate::crypto::{self, DUMMY_PASSWORD_HASH};
use crate::errors::AuthError;
use crate::models::{NewUser, RegisterRequest, User, UserProfile};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_registration;
use crate::repositories::UserRepository;
use common::jwt::ClaimSet;
use common::secret::{ExposeSecret, SecretString};
use tracing::instrument;
use uuid::Uuid;

/// bcrypt only reads the first 72 bytes of a password.
const MAX_PASSWORD_BYTES: usize = 72;

/// Column widths of the `users` table, in characters.
const MAX_EMAIL_CHARS: usize = 255;
const MAX_NAME_CHARS: usize = 255;
const MAX_PHONE_CHARS: usize = 50;

/// Register a new user.
///
/// # Steps
///
/// 1. Normalize and validate the email and profile fields
/// 2. Require a non-empty password within bcrypt's input limit
/// 3. Check the email is not taken
/// 4. Hash the password (bcrypt, configured cost)
/// 5. Insert the user
///
/// A concurrent registration that wins the race between steps 3 and 5 is
/// caught by the unique constraint and still reported as `DuplicateEmail`.
#[instrument(skip_all)]
pub async fn register_user(
    users: &dyn UserRepository,
    bcrypt_cost: u32,
    request: RegisterRequest,
) -> Result<UserProfile, AuthError> {
    let result = register_inner(users, bcrypt_cost, request).await;
    match &result {
        Ok(_) => record_registration("success"),
        Err(e) => record_registration(e.reason()),
    }
    result
}

async fn register_inner(
    users: &dyn UserRepository,
    bcrypt_cost: u32,
    request: RegisterRequest,
) -> Result<UserProfile, AuthError> {
    let email = normalize_email(&request.email);
    if !is_valid_email(&email) {
        return Err(AuthError::Validation("Invalid email format".to_string()));
    }
    check_length("Email", &email, MAX_EMAIL_CHARS)?;

    let phone = non_empty(request.phone);
    let firstname = non_empty(request.firstname);
    let middlename = non_empty(request.middlename);
    let lastname = non_empty(request.lastname);
    for (field, value, max) in [
        ("Phone", &phone, MAX_PHONE_CHARS),
        ("First name", &firstname, MAX_NAME_CHARS),
        ("Middle name", &middlename, MAX_NAME_CHARS),
        ("Last name", &lastname, MAX_NAME_CHARS),
    ] {
        if let Some(value) = value {
            check_length(field, value, max)?;
        }
    }

    let password_len = request.password.expose_secret().len();
    if password_len == 0 {
        return Err(AuthError::Validation("Password is required".to_string()));
    }
    if password_len > MAX_PASSWORD_BYTES {
        return Err(AuthError::Validation(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }

    if users.find_by_email(&email).await?.is_some() {
        tracing::debug!(
            target: "auth.user_service",
            email_hash = %hash_for_correlation(&email),
            "Registration rejected: email already registered"
        );
        return Err(AuthError::DuplicateEmail);
    }

    let password_hash = hash_password_blocking(request.password, bcrypt_cost).await?;

    let user = users
        .create(NewUser {
            user_uuid: Uuid::new_v4(),
            email,
            phone,
            firstname,
            middlename,
            lastname,
            password_hash,
        })
        .await?;

    tracing::info!(
        target: "auth.user_service",
        user_uuid = %user.user_uuid,
        email_hash = %hash_for_correlation(&user.email),
        "User registered"
    );

    Ok(UserProfile::from(&user))
}

/// Check an email/password pair.
///
/// Unknown email and wrong password both return `BadCredentials` and both
/// cost one bcrypt verification. `InactiveAccount` is only reported once the
/// password has been proven correct.
#[instrument(skip_all)]
pub async fn authenticate(
    users: &dyn UserRepository,
    email: &str,
    password: SecretString,
) -> Result<User, AuthError> {
    let email = normalize_email(email);
    let user = users.find_by_email(&email).await?;

    let hash = user
        .as_ref()
        .map(|u| u.password_hash.clone())
        .unwrap_or_else(|| DUMMY_PASSWORD_HASH.to_string());
    let password_matches = verify_password_blocking(password, hash).await?;

    match user {
        Some(user) if password_matches => {
            if !user.is_active {
                tracing::debug!(
                    target: "auth.user_service",
                    user_uuid = %user.user_uuid,
                    "Login rejected: account inactive"
                );
                return Err(AuthError::InactiveAccount);
            }
            Ok(user)
        }
        _ => {
            tracing::debug!(
                target: "auth.user_service",
                email_hash = %hash_for_correlation(&email),
                "Login rejected: bad credentials"
            );
            Err(AuthError::BadCredentials)
        }
    }
}

/// Profile of the token's subject.
#[instrument(skip_all)]
pub async fn current_user(
    users: &dyn UserRepository,
    claims: &ClaimSet,
) -> Result<UserProfile, AuthError> {
    users
        .find_by_id(claims.sub)
        .await?
        .map(|user| UserProfile::from(&user))
        .ok_or(AuthError::UserNotFound)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic shape check: one `@`, non-empty local part, dotted domain with no
/// empty labels.
fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };

    if local.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }

    let domain_parts: Vec<&str> = domain.split('.').collect();
    if domain_parts.len() < 2 {
        return false;
    }

    domain_parts.iter().all(|p| !p.is_empty())
}

fn check_length(field: &str, value: &str, max_chars: usize) -> Result<(), AuthError> {
    if value.chars().count() > max_chars {
        return Err(AuthError::Validation(format!(
            "{} must be at most {} characters",
            field, max_chars
        )));
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn hash_password_blocking(password: SecretString, cost: u32) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || crypto::hash_password(password.expose_secret(), cost))
        .await
        .map_err(|e| {
            tracing::error!(target: "auth.user_service", error = %e, "Password hashing task failed");
            AuthError::Internal
        })?
}

async fn verify_password_blocking(password: SecretString, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || crypto::verify_password(password.expose_secret(), &hash))
        .await
        .map_err(|e| {
            tracing::error!(target: "auth.user_service", error = %e, "Password verification task failed");
            AuthError::Internal
        })?
}
