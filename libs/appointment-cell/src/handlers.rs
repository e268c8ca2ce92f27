use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;

use crate::models::{AppointmentError, BookAppointmentRequest};
use crate::services::BookingService;

fn business_failure(error: &AppointmentError) -> Json<Value> {
    Json(json!({
        "success": false,
        "message": error.to_string()
    }))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&config);

    match service
        .book_appointment(&user.id, request, auth.token())
        .await
    {
        Ok(_) => Ok(Json(json!({
            "success": true,
            "message": "Appointment booked"
        }))),
        Err(AppointmentError::DatabaseError(msg)) => Err(AppError::Database(msg)),
        Err(e) => Ok(business_failure(&e)),
    }
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&config);

    match service.list_appointments(&user.id, auth.token()).await {
        Ok(appointments) => Ok(Json(json!({
            "success": true,
            "appointments": appointments
        }))),
        Err(AppointmentError::DatabaseError(msg)) => Err(AppError::Database(msg)),
        Err(e) => Ok(business_failure(&e)),
    }
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(config): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&config);

    match service
        .cancel_appointment(&user.id, appointment_id, auth.token())
        .await
    {
        Ok(()) => Ok(Json(json!({
            "success": true,
            "message": "Appointment Cancelled"
        }))),
        Err(AppointmentError::DatabaseError(msg)) => Err(AppError::Database(msg)),
        Err(e) => Ok(business_failure(&e)),
    }
}
