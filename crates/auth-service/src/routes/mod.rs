//! HTTP routes for the auth service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::crypto::TokenCodec;
use crate::errors::AuthError;
use crate::handlers;
use crate::middleware::{http_metrics_middleware, require_access_token};
use crate::repositories::{RevocationRepository, TeamRepository, UserRepository};
use crate::services::{RefreshRotator, TokenIssuer, TokenValidator};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use common::secret::ExposeSecret;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    pub users: Arc<dyn UserRepository>,

    /// Consulted on every protected request.
    pub revocations: Arc<dyn RevocationRepository>,

    pub teams: Arc<dyn TeamRepository>,

    pub issuer: Arc<TokenIssuer>,
    pub validator: Arc<TokenValidator>,
    pub rotator: Arc<RefreshRotator>,
}

impl AppState {
    /// Wire the token core from `config` around the given stores.
    ///
    /// One codec instance signs and verifies, so issuer and validator always
    /// agree on the secret.
    pub fn new(
        config: Config,
        users: Arc<dyn UserRepository>,
        revocations: Arc<dyn RevocationRepository>,
        teams: Arc<dyn TeamRepository>,
    ) -> Result<Self, AuthError> {
        let codec = Arc::new(TokenCodec::new(config.jwt_secret.expose_secret())?);

        let issuer = Arc::new(TokenIssuer::new(
            Arc::clone(&codec),
            config.access_token_ttl_seconds,
            config.refresh_token_ttl_seconds,
        ));
        let validator = Arc::new(TokenValidator::new(codec, Arc::clone(&revocations)));
        let rotator = Arc::new(RefreshRotator::new(
            Arc::clone(&validator),
            Arc::clone(&issuer),
        ));

        Ok(Self {
            config,
            users,
            revocations,
            teams,
            issuer,
            validator,
            rotator,
        })
    }
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health`, `/ready`, `/metrics` - operational endpoints, public
/// - `/auth/register`, `/auth/login`, `/auth/refresh` - public
/// - `/auth/logout`, `/auth/me`, `/auth/teams/*` - require an access token
/// - CORS for the configured origins, with credentials so the refresh cookie
///   is sent cross-origin
/// - TraceLayer for request logging
/// - HTTP metrics middleware
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/refresh", get(handlers::refresh))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Protected routes (access token required)
    let protected_routes = Router::new()
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/me", get(handlers::me))
        .route("/auth/teams/create", post(handlers::create_team))
        .route("/auth/teams/:team_id/invite", post(handlers::invite))
        .route("/auth/teams/respond", post(handlers::respond))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_access_token,
        ))
        .with_state(state);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer (innermost)
    // 2. TraceLayer
    // 3. CorsLayer, answers preflights before auth runs
    // 4. http_metrics_middleware (outermost)
    let router = public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http());

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.layer(middleware::from_fn(http_metrics_middleware))
}

/// `None` when no origins are configured: same-origin only.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            // AllowOrigin::list panics on a wildcard
            Ok(_) if origin == "*" => {
                tracing::warn!(target: "auth.routes", "Ignoring wildcard CORS origin");
                None
            }
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(target: "auth.routes", origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(allowed)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}
