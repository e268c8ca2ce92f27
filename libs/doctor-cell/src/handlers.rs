use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::DoctorError;
use crate::services::DoctorService;

#[axum::debug_handler]
pub async fn list_doctors(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);

    let doctors = service.list_doctors(None).await.map_err(|e| match e {
        DoctorError::DatabaseError(msg) => AppError::Database(msg),
        other => AppError::Internal(other.to_string()),
    })?;

    Ok(Json(json!({
        "success": true,
        "doctors": doctors
    })))
}
