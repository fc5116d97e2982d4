use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use transmute_core::{supported_extensions, MediaFamily};

use crate::metrics::encode_metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// One accepted source family.
#[derive(Serialize)]
pub struct FamilyFormats {
    pub family: MediaFamily,
    /// Source extensions, with the leading dot.
    pub extensions: &'static [&'static str],
    /// Adapter serving the family.
    pub adapter: String,
    /// Accepted target formats, or `null` when the engine decides.
    pub output_formats: Option<&'static [&'static str]>,
}

#[derive(Serialize)]
pub struct FormatsResponse {
    pub families: Vec<FamilyFormats>,
}

pub async fn formats(State(state): State<Arc<AppState>>) -> Json<FormatsResponse> {
    let orchestrator = state.orchestrator();
    let families = supported_extensions()
        .into_iter()
        .filter_map(|(family, extensions)| {
            orchestrator.adapter_for(family).map(|adapter| FamilyFormats {
                family,
                extensions,
                adapter: adapter.name().to_string(),
                output_formats: adapter.supported_output_formats(),
            })
        })
        .collect();

    Json(FormatsResponse { families })
}

pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        encode_metrics(),
    )
}
