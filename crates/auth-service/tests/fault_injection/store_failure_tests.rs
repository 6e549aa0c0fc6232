//! Fault injection for revocation store outages.
//!
//! Every protected request reads the revocation store. When that read fails
//! the request must fail closed with 503, never be let through as
//! "not revoked".

use auth_test_utils::{TestAuthServer, TEST_EMAIL_ALICE, TEST_PASSWORD};
use reqwest::StatusCode;
use sqlx::PgPool;

#[tokio::test]
async fn test_protected_request_fails_closed_when_store_down() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
    let session = server.login(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
    let revocations = server.memory_revocations().expect("in-memory server");

    // Act
    revocations.set_failing(true);
    let me = server
        .client()
        .get(format!("{}/auth/me", server.url()))
        .bearer_auth(&session.access_token)
        .send()
        .await?;

    // Assert
    assert_eq!(me.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = me.json().await?;
    assert_eq!(body["error"]["code"], "STORE_UNAVAILABLE");

    // Recovery: the same token works again
    revocations.set_failing(false);
    let me = server
        .client()
        .get(format!("{}/auth/me", server.url()))
        .bearer_auth(&session.access_token)
        .send()
        .await?;
    assert_eq!(me.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_refresh_fails_closed_when_store_down() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
    let session = server.login(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
    server
        .memory_revocations()
        .expect("in-memory server")
        .set_failing(true);

    let response = server.refresh(&session.refresh_token).await?;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}

#[tokio::test]
async fn test_readiness_reports_store_outage() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    server
        .memory_revocations()
        .expect("in-memory server")
        .set_failing(true);

    // Act
    let ready = reqwest::get(format!("{}/ready", server.url())).await?;
    let health = reqwest::get(format!("{}/health", server.url())).await?;

    // Assert
    assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health.status(), StatusCode::OK, "Liveness is unaffected");
    let body: serde_json::Value = ready.json().await?;
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["error"], "Service dependencies unavailable");

    Ok(())
}

/// Closing the pool simulates losing the database under a running server.
#[ignore = "requires DATABASE_URL"]
#[sqlx::test(migrations = "../../migrations")]
async fn test_readiness_returns_503_when_db_unavailable(
    pool: PgPool,
) -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn_with_pool(pool.clone()).await?;
    let response = reqwest::get(format!("{}/ready", server.url())).await?;
    assert_eq!(response.status(), StatusCode::OK);

    // Act
    pool.close().await;

    // Assert
    let response = reqwest::get(format!("{}/ready", server.url())).await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json().await?;
    assert!(
        !body.to_string().contains("postgres"),
        "Error must not leak connection details"
    );

    Ok(())
}
