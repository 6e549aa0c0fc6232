//! E2E tests for tokens the service must refuse.
//!
//! Every rejection is the same 401 body so clients cannot tell a forged
//! token from an expired or revoked one.

use auth_test_utils::{
    foreign_jwt_secret, refresh_set_cookie, sign_claims, test_jwt_secret, TestAuthServer,
    TestTokenBuilder, TEST_EMAIL_ALICE, TEST_PASSWORD,
};
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

async fn me_status(server: &TestAuthServer, token: &str) -> Result<StatusCode, anyhow::Error> {
    Ok(server
        .client()
        .get(format!("{}/auth/me", server.url()))
        .bearer_auth(token)
        .send()
        .await?
        .status())
}

async fn registered_user(server: &TestAuthServer) -> Result<Uuid, anyhow::Error> {
    let body: serde_json::Value = server
        .register(TEST_EMAIL_ALICE, TEST_PASSWORD)
        .await?
        .json()
        .await?;
    Ok(serde_json::from_value(body["user_uuid"].clone())?)
}

#[tokio::test]
async fn test_refresh_with_expired_cookie_is_unauthorized() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    let user = registered_user(&server).await?;
    let expired = TestTokenBuilder::new()
        .for_user(user)
        .refresh()
        .expired_seconds_ago(1)
        .sign(&test_jwt_secret());

    // Act
    let response = server.refresh(&expired).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(
        refresh_set_cookie(&response).is_none(),
        "No new pair may be issued"
    );
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
    assert!(body.get("accessToken").is_none());

    Ok(())
}

#[tokio::test]
async fn test_access_token_as_refresh_cookie_is_unauthorized() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
    let session = server.login(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    // Act
    let response = server.refresh(&session.access_token).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(refresh_set_cookie(&response).is_none());

    Ok(())
}

#[tokio::test]
async fn test_refresh_token_as_bearer_is_unauthorized() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
    let session = server.login(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    assert_eq!(
        me_status(&server, &session.refresh_token).await?,
        StatusCode::UNAUTHORIZED
    );

    Ok(())
}

#[tokio::test]
async fn test_expired_access_token_is_unauthorized() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let user = registered_user(&server).await?;

    let expired = TestTokenBuilder::new()
        .for_user(user)
        .expired_seconds_ago(1)
        .sign(&test_jwt_secret());

    assert_eq!(me_status(&server, &expired).await?, StatusCode::UNAUTHORIZED);

    // Same claims, still live: accepted
    let live = TestTokenBuilder::new()
        .for_user(user)
        .expires_in(60)
        .sign(&test_jwt_secret());
    assert_eq!(me_status(&server, &live).await?, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_foreign_signature_is_unauthorized() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let user = registered_user(&server).await?;

    let forged = TestTokenBuilder::new()
        .for_user(user)
        .sign(&foreign_jwt_secret());

    assert_eq!(me_status(&server, &forged).await?, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_token_without_type_claim_is_unauthorized() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let user = registered_user(&server).await?;
    let now = Utc::now().timestamp();

    let untyped = sign_claims(
        &json!({ "sub": user, "jti": Uuid::new_v4(), "iat": now, "exp": now + 60 }),
        &test_jwt_secret(),
    );

    assert_eq!(me_status(&server, &untyped).await?, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_rejections_share_one_body() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    let user = registered_user(&server).await?;
    let expired = TestTokenBuilder::new()
        .for_user(user)
        .expired_seconds_ago(1)
        .sign(&test_jwt_secret());
    let forged = TestTokenBuilder::new()
        .for_user(user)
        .sign(&foreign_jwt_secret());

    // Act
    let mut bodies = Vec::new();
    for token in [expired.as_str(), forged.as_str(), "garbage"] {
        let body: serde_json::Value = server
            .client()
            .get(format!("{}/auth/me", server.url()))
            .bearer_auth(token)
            .send()
            .await?
            .json()
            .await?;
        bodies.push(body);
    }

    // Assert
    assert!(bodies.windows(2).all(|w| w.first() == w.last()), "{bodies:?}");

    Ok(())
}

#[tokio::test]
async fn test_missing_or_malformed_authorization_header() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let missing = server
        .client()
        .get(format!("{}/auth/me", server.url()))
        .send()
        .await?;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let basic = server
        .client()
        .get(format!("{}/auth/me", server.url()))
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await?;
    assert_eq!(basic.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_token_for_deleted_user_is_not_found() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    let user = registered_user(&server).await?;
    let session = server.login(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
    server
        .memory_users()
        .expect("in-memory server")
        .remove(user)
        .await;

    // Act / Assert: the token is still valid, the identity is gone
    assert_eq!(
        me_status(&server, &session.access_token).await?,
        StatusCode::NOT_FOUND
    );

    Ok(())
}
