use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    state::AppState,
};

pub mod history;
pub mod movies;
pub mod party;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/movies", post(movies::suggest_movies))
        .route("/time-based-suggestions", get(movies::time_based_suggestions))
        .route("/history/:email", get(history::list_history))
        .route("/history/:email/watch", post(history::log_watch))
        .route(
            "/history/:email/recommendations",
            get(history::recommend_from_history),
        )
        .route("/party/suggest", post(party::suggest_for_members))
        .route("/party/:party_id/members", get(party::members))
        .route("/ws/:party_id/:user_id", get(party::ws_handler))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
