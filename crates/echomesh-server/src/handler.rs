//! Request handler for the dispatch boundary.
//!
//! One handler invocation is one call: it opens a span scoped to the call,
//! sends the request to the forwarder, suspends until either the reply
//! arrives or the deadline elapses, and translates the terminal outcome into
//! an HTTP response. The span closes exactly once on every path.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use echomesh_cluster::ForwarderHandle;
use echomesh_common::protocol::{format_correlation_id, next_correlation_id};
use echomesh_common::DispatchOutcome;
use echomesh_metrics::MetricsRegistry;
use tracing::{debug, info_span, Instrument, Span};

/// Shared state of the HTTP boundary.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: ForwarderHandle,
    pub metrics: Arc<MetricsRegistry>,
    pub ask_deadline: Duration,
}

/// Handles `GET /`: dispatches one request into the cluster and waits for
/// its reply.
pub async fn handle_hit(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let correlation = correlation_from(&headers);
    let started = Instant::now();

    let span = info_span!(
        "cluster.ask",
        correlation = %correlation,
        outcome = tracing::field::Empty,
    );
    let outcome = dispatch(&state, &correlation).instrument(span).await;

    state.metrics.record_dispatch(&outcome, started);
    outcome_response(outcome)
}

/// Handles `GET /metrics`: serves a point-in-time metrics snapshot.
pub async fn handle_metrics(State(state): State<AppState>) -> Response {
    axum::Json(state.metrics.snapshot()).into_response()
}

/// Handles `GET /__health`: liveness probe.
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Runs one dispatch-and-wait under the configured deadline and produces the
/// call's terminal outcome. Instrumented by the caller's span, which closes
/// when this future completes, whatever path it took.
async fn dispatch(state: &AppState, correlation: &str) -> DispatchOutcome {
    let payload = format!("hit from {correlation}");

    let outcome = match state.forwarder.submit(payload).await {
        Err(err) => DispatchOutcome::from(err),
        Ok(pending) => match tokio::time::timeout(state.ask_deadline, pending.wait()).await {
            Ok(Ok(reply)) => DispatchOutcome::Success { reply },
            Ok(Err(err)) => DispatchOutcome::from(err),
            // The pending reply is dropped here; a reply that arrives later
            // finds its slot closed and is discarded.
            Err(_elapsed) => {
                debug!(
                    deadline_ms = state.ask_deadline.as_millis() as u64,
                    "deadline elapsed before a reply arrived"
                );
                DispatchOutcome::Timeout
            }
        },
    };

    Span::current().record("outcome", outcome.label());
    outcome
}

fn correlation_from(headers: &HeaderMap) -> String {
    headers
        .get("x-correlation-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| format_correlation_id(next_correlation_id()))
}

fn outcome_response(outcome: DispatchOutcome) -> Response {
    match outcome {
        DispatchOutcome::Success { reply } => (StatusCode::OK, reply).into_response(),
        DispatchOutcome::Timeout => {
            (StatusCode::GATEWAY_TIMEOUT, "request timed out".to_string()).into_response()
        }
        DispatchOutcome::NoAvailableTarget => (
            StatusCode::SERVICE_UNAVAILABLE,
            "no reachable workers".to_string(),
        )
            .into_response(),
        DispatchOutcome::RoutingFailure { detail } => {
            (StatusCode::BAD_GATEWAY, format!("routing failure: {detail}")).into_response()
        }
    }
}
