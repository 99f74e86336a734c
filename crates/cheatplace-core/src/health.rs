//! Liveness and readiness probes.

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;

/// `GET /healthz` and `GET /readyz`, both answering 200 while the process serves.
///
/// Readiness does not probe the database: a store outage surfaces as 500s on
/// the endpoints that need it, and health checks must not add load to it.
pub fn health_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/healthz", get(probe))
        .route("/readyz", get(probe))
}

async fn probe() -> StatusCode {
    StatusCode::OK
}
