//! Metrics definitions for the auth service
//!
//! All metrics follow Prometheus naming conventions:
//! - `auth_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `operation`: login, refresh
//! - `status`: success, error
//! - `token_type`: access, refresh
//! - `reason`: the fixed set from `AuthError::reason`
//! - `outcome`: small per-metric enums
//! - `path`: normalized to known routes, everything else is `/other`

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the global Prometheus recorder and return its render handle.
///
/// Fails if a recorder is already installed in this process.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // HTTP request buckets; bcrypt dominates login latency
        .set_buckets_for_metric(
            Matcher::Prefix("auth_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // Token issuance is pure CPU; sub-millisecond to a few ms
        .set_buckets_for_metric(
            Matcher::Prefix("auth_token_issuance".to_string()),
            &[0.0005, 0.001, 0.002, 0.005, 0.010, 0.025, 0.050, 0.100],
        )
        .map_err(|e| format!("Failed to set token issuance buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record token pair issuance duration and outcome
///
/// Metric: `auth_token_issuance_duration_seconds`, `auth_token_issuance_total`
/// Labels: `operation`, `status`
pub fn record_token_issuance(operation: &str, status: &str, duration: Duration) {
    histogram!("auth_token_issuance_duration_seconds", "operation" => operation.to_string(), "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("auth_token_issuance_total", "operation" => operation.to_string(), "status" => status.to_string())
        .increment(1);
}

/// Record a token validation verdict
///
/// Metric: `auth_token_validations_total`
/// Labels: `token_type`, `status`, `reason`
pub fn record_token_validation(token_type: &str, status: &str, reason: Option<&str>) {
    let reason = reason.unwrap_or("none");
    counter!("auth_token_validations_total",
        "token_type" => token_type.to_string(),
        "status" => status.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

// ============================================================================
// Revocation Metrics
// ============================================================================

/// Record a logout revocation
///
/// Metric: `auth_revocations_total`
/// Labels: `outcome` (revoked, already_revoked, error)
pub fn record_revocation(outcome: &str) {
    counter!("auth_revocations_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record entries pruned by one revocation sweep
///
/// Metric: `auth_revocation_sweep_deleted_total`, `auth_revocation_sweeps_total`
pub fn record_revocation_sweep(status: &str, deleted: u64) {
    counter!("auth_revocation_sweeps_total", "status" => status.to_string()).increment(1);
    counter!("auth_revocation_sweep_deleted_total").increment(deleted);
}

// ============================================================================
// Account Metrics
// ============================================================================

/// Record a login attempt
///
/// Metric: `auth_login_attempts_total`
/// Labels: `outcome` (success, bad_credentials, inactive_account, error)
pub fn record_login_attempt(outcome: &str) {
    counter!("auth_login_attempts_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record a registration attempt
///
/// Metric: `auth_registrations_total`
/// Labels: `outcome`
pub fn record_registration(outcome: &str) {
    counter!("auth_registrations_total", "outcome" => outcome.to_string()).increment(1);
}

// ============================================================================
// Error Metrics
// ============================================================================

/// Record an error response by category
///
/// Metric: `auth_errors_total`
/// Labels: `reason`, `error_category`, `status_code`
pub fn record_error(reason: &str, error_category: &str, status_code: u16) {
    counter!("auth_errors_total",
        "reason" => reason.to_string(),
        "error_category" => error_category.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record an HTTP request
///
/// Metric: `auth_http_request_duration_seconds`, `auth_http_requests_total`
/// Labels: `method`, `path`, `status_code`
pub fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    let normalized_path = normalize_path(path);

    histogram!("auth_http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => normalized_path.clone(),
        "status_code" => status_code.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("auth_http_requests_total",
        "method" => method.to_string(),
        "path" => normalized_path,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

fn normalize_path(path: &str) -> String {
    match path {
        "/" | "/health" | "/ready" | "/metrics" | "/auth/register" | "/auth/login"
        | "/auth/refresh" | "/auth/logout" | "/auth/me" | "/auth/teams/create"
        | "/auth/teams/respond" => path.to_string(),
        _ => normalize_dynamic_path(path),
    }
}

/// `/auth/teams/{uuid}/invite` → `/auth/teams/{id}/invite`; anything else → `/other`
fn normalize_dynamic_path(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').collect();

    if let ["", "auth", "teams", id, "invite"] = parts.as_slice() {
        if is_uuid(id) {
            return "/auth/teams/{id}/invite".to_string();
        }
    }

    "/other".to_string()
}

/// Check if a string matches UUID format (8-4-4-4-12 hex digits with dashes)
fn is_uuid(s: &str) -> bool {
    if s.len() != 36 {
        return false;
    }

    s.bytes().enumerate().all(|(i, byte)| match i {
        8 | 13 | 18 | 23 => byte == b'-',
        _ => byte.is_ascii_hexdigit(),
    })
}
