//! Test server harness for E2E testing
//!
//! Provides `TestAuthServer` for spawning real auth service instances in
//! tests, either over in-memory stores or over a Postgres pool.

use crate::crypto_fixtures::test_config;
use auth_service::config::Config;
use auth_service::observability::metrics::init_metrics_recorder;
use auth_service::repositories::{
    InMemoryRevocationRepository, InMemoryTeamRepository, InMemoryUserRepository,
    PgRevocationRepository, PgTeamRepository, PgUserRepository,
};
use auth_service::routes::{self, AppState};
use auth_service::transport::REFRESH_COOKIE_NAME;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::json;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Test harness for spawning the auth service in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_login_e2e() -> Result<()> {
///     let server = TestAuthServer::spawn().await?;
///     server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
///
///     let session = server.login(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
///     assert!(!session.access_token.is_empty());
///     Ok(())
/// }
/// ```
pub struct TestAuthServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    client: reqwest::Client,
    memory_revocations: Option<Arc<InMemoryRevocationRepository>>,
    memory_users: Option<Arc<InMemoryUserRepository>>,
    _handle: JoinHandle<()>,
}

/// Tokens handed out by a successful login.
#[derive(Debug, Clone)]
pub struct TestSession {
    pub access_token: String,
    pub refresh_token: String,
}

impl TestAuthServer {
    /// Spawn a server over fresh in-memory stores.
    ///
    /// The stores stay reachable through [`Self::memory_revocations`] and
    /// [`Self::memory_users`] so tests can inject outages or deactivate users.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        let revocations = Arc::new(InMemoryRevocationRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());

        let state = AppState::new(
            test_config(),
            users.clone(),
            revocations.clone(),
            Arc::new(InMemoryTeamRepository::new()),
        )
        .map_err(|e| anyhow::anyhow!("Failed to build app state: {}", e))?;

        Self::start(state, Some(revocations), Some(users)).await
    }

    /// Spawn a server over Postgres.
    ///
    /// # Arguments
    /// * `pool` - Database connection pool (typically from `#[sqlx::test]`)
    pub async fn spawn_with_pool(pool: PgPool) -> Result<Self, anyhow::Error> {
        let state = AppState::new(
            test_config(),
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgRevocationRepository::new(pool.clone())),
            Arc::new(PgTeamRepository::new(pool)),
        )
        .map_err(|e| anyhow::anyhow!("Failed to build app state: {}", e))?;

        Self::start(state, None, None).await
    }

    async fn start(
        state: AppState,
        memory_revocations: Option<Arc<InMemoryRevocationRepository>>,
        memory_users: Option<Arc<InMemoryUserRepository>>,
    ) -> Result<Self, anyhow::Error> {
        let state = Arc::new(state);

        // The global recorder can only be installed once per test process.
        // Later servers get a standalone recorder.
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => PrometheusBuilder::new().build_recorder().handle(),
        };

        let app = routes::build_routes(state.clone(), metrics_handle);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            client: reqwest::Client::new(),
            memory_revocations,
            memory_users,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// HTTP client without a cookie store; cookies are passed explicitly.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.state.config
    }

    /// `None` for Postgres-backed servers.
    pub fn memory_revocations(&self) -> Option<&InMemoryRevocationRepository> {
        self.memory_revocations.as_deref()
    }

    /// `None` for Postgres-backed servers.
    pub fn memory_users(&self) -> Option<&InMemoryUserRepository> {
        self.memory_users.as_deref()
    }

    /// POST /auth/register
    pub async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<reqwest::Response, anyhow::Error> {
        Ok(self
            .client
            .post(format!("{}/auth/register", self.url()))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?)
    }

    /// POST /auth/login, failing unless it succeeds with a refresh cookie.
    pub async fn login(&self, email: &str, password: &str) -> Result<TestSession, anyhow::Error> {
        let response = self
            .client
            .post(format!("{}/auth/login", self.url()))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        anyhow::ensure!(
            response.status() == reqwest::StatusCode::OK,
            "Login failed with status {}",
            response.status()
        );

        let refresh_token = refresh_cookie_value(&response)
            .ok_or_else(|| anyhow::anyhow!("Login response set no refresh cookie"))?;
        let body: serde_json::Value = response.json().await?;
        let access_token = body["accessToken"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Login response has no accessToken"))?
            .to_string();

        Ok(TestSession {
            access_token,
            refresh_token,
        })
    }

    /// GET /auth/refresh presenting `refresh_token` as the cookie.
    pub async fn refresh(&self, refresh_token: &str) -> Result<reqwest::Response, anyhow::Error> {
        Ok(self
            .client
            .get(format!("{}/auth/refresh", self.url()))
            .header(
                reqwest::header::COOKIE,
                format!("{}={}", REFRESH_COOKIE_NAME, refresh_token),
            )
            .send()
            .await?)
    }
}

/// Value of the `refresh` cookie set by `response`, if any.
pub fn refresh_cookie_value(response: &reqwest::Response) -> Option<String> {
    refresh_set_cookie(response).and_then(|header| {
        header
            .split(';')
            .next()
            .and_then(|pair| pair.split_once('='))
            .map(|(_, value)| value.to_string())
    })
}

/// Full `Set-Cookie` header for the `refresh` cookie, attributes included.
pub fn refresh_set_cookie(response: &reqwest::Response) -> Option<String> {
    let prefix = format!("{}=", REFRESH_COOKIE_NAME);
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
        .map(str::to_string)
}

impl Drop for TestAuthServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
