use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_utils::jwt::issue_token;

use crate::models::{LoginRequest, RegisterRequest, UpdateProfileRequest, UserError};
use crate::services::{AccountService, AvatarService, ProfileService};

const SESSION_TTL_HOURS: i64 = 24 * 30;

/// Expected failures become `{success: false, message}` on a 200;
/// unexpected ones go through `AppError` and get sanitized.
fn business_failure(error: &UserError) -> Json<Value> {
    Json(json!({
        "success": false,
        "message": error.to_string()
    }))
}

#[axum::debug_handler]
pub async fn register_user(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AccountService::new(&config);

    match service.register(request).await {
        Ok(user) => {
            let token = issue_token(
                &user.id.to_string(),
                Some(&user.email),
                &config.supabase_jwt_secret,
                SESSION_TTL_HOURS,
            )
            .map_err(AppError::Internal)?;

            Ok(Json(json!({
                "success": true,
                "token": token
            })))
        }
        Err(UserError::DatabaseError(msg)) => Err(AppError::Database(msg)),
        Err(UserError::Hashing(msg)) => Err(AppError::Internal(msg)),
        Err(e) => Ok(business_failure(&e)),
    }
}

#[axum::debug_handler]
pub async fn login_user(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AccountService::new(&config);

    match service.login(request).await {
        Ok(user) => {
            let token = issue_token(
                &user.id.to_string(),
                Some(&user.email),
                &config.supabase_jwt_secret,
                SESSION_TTL_HOURS,
            )
            .map_err(AppError::Internal)?;

            Ok(Json(json!({
                "success": true,
                "token": token
            })))
        }
        Err(UserError::DatabaseError(msg)) => Err(AppError::Database(msg)),
        Err(UserError::Hashing(msg)) => Err(AppError::Internal(msg)),
        Err(e) => Ok(business_failure(&e)),
    }
}

#[axum::debug_handler]
pub async fn get_profile(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = ProfileService::new(&config);

    match service.get_profile(&user.id, auth.token()).await {
        Ok(profile) => Ok(Json(json!({
            "success": true,
            "userData": profile
        }))),
        Err(UserError::DatabaseError(msg)) => Err(AppError::Database(msg)),
        Err(e) => Ok(business_failure(&e)),
    }
}

#[axum::debug_handler]
pub async fn update_profile(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    let profile_service = ProfileService::new(&config);

    if let Err(e) = profile_service
        .update_profile(&user.id, &request, auth.token())
        .await
    {
        return match e {
            UserError::DatabaseError(msg) => Err(AppError::Database(msg)),
            other => Ok(business_failure(&other)),
        };
    }

    // Second, separate write: the avatar goes to object storage and the
    // resulting URL onto the user row.
    if let Some(image) = &request.image {
        let avatar_service = AvatarService::new(&config);
        if let Err(e) = avatar_service
            .upload_user_image(&user.id, image, auth.token())
            .await
        {
            return match e {
                UserError::Upload(msg) => Err(AppError::ExternalService(msg)),
                UserError::DatabaseError(msg) => Err(AppError::Database(msg)),
                other => Ok(business_failure(&other)),
            };
        }
    }

    Ok(Json(json!({
        "success": true,
        "message": "Profile Updated"
    })))
}
