use axum::Json;
use axum::extract::State;

use crate::error::{AppError, ErrorBody};
use crate::models::video::HealthResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    operation_id = "health",
    summary = "Readiness probe",
    description = "Reports whether the database connection is established and the store is serving.",
    responses(
        (status = 200, description = "Ready", body = HealthResponse),
        (status = 503, description = "Storage not ready (STORAGE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    state.store.get()?;
    Ok(Json(HealthResponse {
        status: "ok".into(),
    }))
}
