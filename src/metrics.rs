//! Prometheus metrics: the HTTP middleware, the exporter, and workflow counters.
//!
//! The `track_*` helpers are no-ops until [`init_metrics`] installs a recorder,
//! so tests and metrics-disabled deployments pay nothing for them.

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use mindflow_config::ObservabilityConfig;
use std::time::{Duration, Instant};

/// Installs the Prometheus recorder and its upkeep task.
///
/// Returns `Ok(None)` when metrics are disabled.
pub fn init_metrics(config: &ObservabilityConfig) -> Result<Option<PrometheusHandle>, BuildError> {
    if !config.metrics_enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5,
                10.0,
            ],
        )?
        .install_recorder()?;

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Ok(Some(handle))
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16();

    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status.to_string()).increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);

    let status_category = match status {
        200..=299 => "2xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    };
    counter!("http_requests_by_status", "status_category" => status_category).increment(1);

    gauge!("http_requests_active").decrement(1.0);

    response
}

/// Router for the separate metrics listener.
pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

// Workflow metrics

/// `kind` is `expert` or `consultation`.
pub fn track_application_submitted(kind: &'static str) {
    counter!("applications_submitted_total", "kind" => kind).increment(1);
}

pub fn track_application_decided(kind: &'static str, outcome: &'static str) {
    counter!("application_decisions_total", "kind" => kind, "outcome" => outcome).increment(1);
}

pub fn track_decision_conflict(kind: &'static str) {
    counter!("application_decision_conflicts_total", "kind" => kind).increment(1);
}

pub fn track_meeting_scheduled() {
    counter!("meetings_scheduled_total").increment(1);
}

pub fn track_notification_failed(notification: &'static str) {
    counter!("notification_failures_total", "notification" => notification).increment(1);
}

pub fn track_role_grant_retry(succeeded: bool) {
    let status = if succeeded { "recovered" } else { "failed" };
    counter!("role_grant_retries_total", "status" => status).increment(1);
}

// Auth metrics

pub fn track_user_registered() {
    counter!("users_registered_total").increment(1);
}

pub fn track_login(success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("user_logins_total", "status" => status).increment(1);
}

/// `gate` names the access-control gate that refused the request.
pub fn track_access_denied(gate: &'static str) {
    counter!("access_denied_total", "gate" => gate).increment(1);
}
