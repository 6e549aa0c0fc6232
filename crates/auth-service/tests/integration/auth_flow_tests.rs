//! E2E tests for the register / login / me / logout / refresh flows.
//!
//! ## Test Naming
//!
//! Tests follow the convention: `test_<feature>_<scenario>_<expected_result>`

use auth_test_utils::{
    refresh_cookie_value, refresh_set_cookie, TestAuthServer, TokenAssertions, TEST_EMAIL_ALICE,
    TEST_PASSWORD,
};
use common::jwt::TokenType;
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_happy_path() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/auth/register", server.url()))
        .json(&json!({
            "email": "a@b.com",
            "password": "p1",
            "firstname": "Ada",
            "lastname": "Lovelace"
        }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["email"], "a@b.com");
    assert_eq!(body["firstname"], "Ada");
    assert!(Uuid::parse_str(body["user_uuid"].as_str().unwrap_or_default()).is_ok());
    assert!(
        body.get("password_hash").is_none(),
        "Profile must not expose the password hash"
    );

    Ok(())
}

#[tokio::test]
async fn test_register_duplicate_email_returns_400() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    let first = server.register("a@b.com", "p1").await?;
    assert_eq!(first.status(), StatusCode::CREATED);

    // Act
    let second = server.register("a@b.com", "p1").await?;

    // Assert
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = second.json().await?;
    assert_eq!(body["error"]["code"], "EMAIL_ALREADY_REGISTERED");

    Ok(())
}

#[tokio::test]
async fn test_register_oversized_phone_returns_400() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/auth/register", server.url()))
        .json(&json!({
            "email": "a@b.com",
            "password": "p1",
            "phone": "1".repeat(51)
        }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    Ok(())
}

#[tokio::test]
async fn test_register_malformed_email_returns_400() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = server.register("not-an-email", "p1").await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    Ok(())
}

// ============================================================================
// Login and /auth/me
// ============================================================================

#[tokio::test]
async fn test_login_then_me_returns_same_identity() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    let registered: serde_json::Value = server
        .register(TEST_EMAIL_ALICE, TEST_PASSWORD)
        .await?
        .json()
        .await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/auth/login", server.url()))
        .json(&json!({ "email": TEST_EMAIL_ALICE, "password": TEST_PASSWORD }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = refresh_set_cookie(&response).expect("login must set the refresh cookie");
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/auth"));
    assert!(set_cookie.contains("Expires="));

    let refresh_token = refresh_cookie_value(&response).expect("refresh cookie value");
    refresh_token
        .assert_valid_jwt()
        .assert_token_type(TokenType::Refresh)
        .assert_expires_in(server.config().refresh_token_ttl_seconds);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["email"], TEST_EMAIL_ALICE);
    let access_token = body["accessToken"].as_str().unwrap_or_default().to_string();
    access_token
        .assert_valid_jwt()
        .assert_token_type(TokenType::Access)
        .assert_expires_in(server.config().access_token_ttl_seconds);

    let me = server
        .client()
        .get(format!("{}/auth/me", server.url()))
        .bearer_auth(&access_token)
        .send()
        .await?;
    assert_eq!(me.status(), StatusCode::OK);
    let me: serde_json::Value = me.json().await?;
    assert_eq!(me["user_uuid"], registered["user_uuid"]);
    assert_eq!(me["email"], TEST_EMAIL_ALICE);

    Ok(())
}

#[tokio::test]
async fn test_login_unknown_email_and_wrong_password_look_alike() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    // Act
    let wrong_password = server
        .client()
        .post(format!("{}/auth/login", server.url()))
        .json(&json!({ "email": TEST_EMAIL_ALICE, "password": "nope" }))
        .send()
        .await?;
    let unknown_email = server
        .client()
        .post(format!("{}/auth/login", server.url()))
        .json(&json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }))
        .send()
        .await?;

    // Assert
    assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
    assert_eq!(unknown_email.status(), StatusCode::BAD_REQUEST);
    assert!(refresh_set_cookie(&wrong_password).is_none());
    let a: serde_json::Value = wrong_password.json().await?;
    let b: serde_json::Value = unknown_email.json().await?;
    assert_eq!(a, b, "Error bodies must not reveal which part was wrong");

    Ok(())
}

#[tokio::test]
async fn test_login_inactive_account_returns_403() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    let registered: serde_json::Value = server
        .register(TEST_EMAIL_ALICE, TEST_PASSWORD)
        .await?
        .json()
        .await?;
    let user_uuid: Uuid = serde_json::from_value(registered["user_uuid"].clone())?;
    let users = server.memory_users().expect("in-memory server");
    users.set_active(user_uuid, false).await;

    // Act
    let response = server
        .client()
        .post(format!("{}/auth/login", server.url()))
        .json(&json!({ "email": TEST_EMAIL_ALICE, "password": TEST_PASSWORD }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(refresh_set_cookie(&response).is_none());

    Ok(())
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_then_reuse_access_token_is_unauthorized() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
    let session = server.login(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    // Act
    let logout = server
        .client()
        .post(format!("{}/auth/logout", server.url()))
        .bearer_auth(&session.access_token)
        .send()
        .await?;

    // Assert
    assert_eq!(logout.status(), StatusCode::OK);
    let body: serde_json::Value = logout.json().await?;
    assert!(body["msg"].as_str().is_some());

    let me = server
        .client()
        .get(format!("{}/auth/me", server.url()))
        .bearer_auth(&session.access_token)
        .send()
        .await?;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);

    let second_logout = server
        .client()
        .post(format!("{}/auth/logout", server.url()))
        .bearer_auth(&session.access_token)
        .send()
        .await?;
    assert_eq!(second_logout.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_logout_leaves_other_sessions_alone() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
    let first = server.login(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
    let second = server.login(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    // Act
    server
        .client()
        .post(format!("{}/auth/logout", server.url()))
        .bearer_auth(&first.access_token)
        .send()
        .await?;

    // Assert
    let me = server
        .client()
        .get(format!("{}/auth/me", server.url()))
        .bearer_auth(&second.access_token)
        .send()
        .await?;
    assert_eq!(me.status(), StatusCode::OK);

    // Logout revokes the access token only; the refresh token still works
    let refreshed = server.refresh(&first.refresh_token).await?;
    assert_eq!(refreshed.status(), StatusCode::OK);

    Ok(())
}

// ============================================================================
// Refresh
// ============================================================================

#[tokio::test]
async fn test_refresh_returns_new_pair() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
    let session = server.login(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    // Act
    let response = server.refresh(&session.refresh_token).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let new_refresh = refresh_cookie_value(&response).expect("rotated refresh cookie");
    assert_ne!(new_refresh, session.refresh_token);

    let body: serde_json::Value = response.json().await?;
    let access_token = body["accessToken"].as_str().unwrap_or_default().to_string();
    assert_ne!(access_token, session.access_token);

    let me = server
        .client()
        .get(format!("{}/auth/me", server.url()))
        .bearer_auth(&access_token)
        .send()
        .await?;
    assert_eq!(me.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_refresh_old_token_stays_usable() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
    let session = server.login(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
    let first = server.refresh(&session.refresh_token).await?;
    assert_eq!(first.status(), StatusCode::OK);

    // Act
    let second = server.refresh(&session.refresh_token).await?;

    // Assert
    assert_eq!(second.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_refresh_without_cookie_returns_400() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = server
        .client()
        .get(format!("{}/auth/refresh", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "REFRESH_TOKEN_REQUIRED");

    Ok(())
}
