use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{convert, handlers, middleware::metrics_middleware};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = usize::try_from(state.config().uploads.max_size_bytes).unwrap_or(usize::MAX);
    let cors_permissive = state.config().server.cors_permissive;

    let router = Router::new()
        // Conversion
        .route("/convert", post(convert::convert))
        // Discovery and health
        .route("/formats", get(handlers::formats))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
