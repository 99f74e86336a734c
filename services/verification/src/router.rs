use axum::{Router, routing::post};
use tower_http::trace::TraceLayer;

use cheatplace_core::health::health_routes;
use cheatplace_core::middleware::{cors_layer, propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    admin::{ban_user, notify_new_offer},
    options_ok,
    verification::{issue_code, verify_code},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes::<AppState>())
        // Verification codes
        .route(
            "/issue-verification-code",
            post(issue_code).options(options_ok),
        )
        .route("/verify-code", post(verify_code).options(options_ok))
        // Admin
        .route("/ban-user", post(ban_user).options(options_ok))
        .route(
            "/notify-new-offer",
            post(notify_new_offer).options(options_ok),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
