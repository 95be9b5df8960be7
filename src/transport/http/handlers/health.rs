use crate::transport::http::types::{AppState, HealthResponse};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up; lists the registered tables", body = HealthResponse)
    )
)]
pub async fn healthcheck_handler(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.engine.registry();
    let tables = registry
        .list_tables()
        .into_iter()
        .map(|t| t.to_string())
        .collect();
    let remote_delegation = state.engine.policy().needs_remote();

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            tables,
            remote_delegation,
        }),
    )
}
