//! E2E tests for team creation and invitations.

use auth_test_utils::{
    TestAuthServer, TestSession, TEST_EMAIL_ALICE, TEST_EMAIL_BOB, TEST_PASSWORD,
    TEST_TEAM_MISSING,
};
use reqwest::StatusCode;
use serde_json::json;

async fn signed_in(server: &TestAuthServer, email: &str) -> Result<TestSession, anyhow::Error> {
    server.register(email, TEST_PASSWORD).await?;
    server.login(email, TEST_PASSWORD).await
}

async fn create_team(
    server: &TestAuthServer,
    session: &TestSession,
    name: &str,
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(server
        .client()
        .post(format!("{}/auth/teams/create", server.url()))
        .bearer_auth(&session.access_token)
        .json(&json!({ "name": name }))
        .send()
        .await?)
}

#[tokio::test]
async fn test_team_invite_and_accept_flow() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    let alice = signed_in(&server, TEST_EMAIL_ALICE).await?;
    let bob = signed_in(&server, TEST_EMAIL_BOB).await?;

    let created = create_team(&server, &alice, "design").await?;
    assert_eq!(created.status(), StatusCode::OK);
    let created: serde_json::Value = created.json().await?;
    let team_id = created["team_id"].as_str().unwrap_or_default().to_string();
    assert_eq!(created["name"], "design");

    // Act
    let invite = server
        .client()
        .post(format!("{}/auth/teams/{}/invite", server.url(), team_id))
        .bearer_auth(&alice.access_token)
        .json(&json!({ "email": TEST_EMAIL_BOB }))
        .send()
        .await?;
    let respond = server
        .client()
        .post(format!("{}/auth/teams/respond", server.url()))
        .bearer_auth(&bob.access_token)
        .json(&json!({ "team_id": team_id, "status": "accepted" }))
        .send()
        .await?;

    // Assert
    assert_eq!(invite.status(), StatusCode::OK);
    let invite: serde_json::Value = invite.json().await?;
    assert_eq!(
        invite["msg"],
        format!("User {} invited to team {}", TEST_EMAIL_BOB, team_id)
    );

    assert_eq!(respond.status(), StatusCode::OK);
    let respond: serde_json::Value = respond.json().await?;
    assert_eq!(
        respond["msg"],
        format!("Your invite to team {} was accepted", team_id)
    );

    Ok(())
}

#[tokio::test]
async fn test_team_duplicate_name_returns_400() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let alice = signed_in(&server, TEST_EMAIL_ALICE).await?;

    assert_eq!(
        create_team(&server, &alice, "design").await?.status(),
        StatusCode::OK
    );
    let second = create_team(&server, &alice, "design").await?;

    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = second.json().await?;
    assert_eq!(body["error"]["code"], "TEAM_ALREADY_EXISTS");

    Ok(())
}

#[tokio::test]
async fn test_respond_unknown_status_returns_400() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    let alice = signed_in(&server, TEST_EMAIL_ALICE).await?;

    // Act
    let response = server
        .client()
        .post(format!("{}/auth/teams/respond", server.url()))
        .bearer_auth(&alice.access_token)
        .json(&json!({ "team_id": TEST_TEAM_MISSING, "status": "maybe" }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_STATUS");

    Ok(())
}

#[tokio::test]
async fn test_invite_to_missing_team_returns_404() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let alice = signed_in(&server, TEST_EMAIL_ALICE).await?;
    signed_in(&server, TEST_EMAIL_BOB).await?;

    let response = server
        .client()
        .post(format!(
            "{}/auth/teams/{}/invite",
            server.url(),
            TEST_TEAM_MISSING
        ))
        .bearer_auth(&alice.access_token)
        .json(&json!({ "email": TEST_EMAIL_BOB }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_non_member_cannot_invite() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    let alice = signed_in(&server, TEST_EMAIL_ALICE).await?;
    let bob = signed_in(&server, TEST_EMAIL_BOB).await?;
    let created: serde_json::Value = create_team(&server, &alice, "design").await?.json().await?;
    let team_id = created["team_id"].as_str().unwrap_or_default().to_string();

    // Act
    let response = server
        .client()
        .post(format!("{}/auth/teams/{}/invite", server.url(), team_id))
        .bearer_auth(&bob.access_token)
        .json(&json!({ "email": TEST_EMAIL_ALICE }))
        .send()
        .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}
