use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::UserError;

pub struct AvatarService {
    supabase: SupabaseClient,
}

impl AvatarService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Push a base64 data URI to object storage and persist the resulting
    /// public URL on the user row (a second write, separate from the
    /// profile-field update).
    pub async fn upload_user_image(
        &self,
        user_id: &str,
        base64_image: &str,
        auth_token: &str,
    ) -> Result<String, UserError> {
        debug!("Uploading profile image for user: {}", user_id);

        // "data:image/jpeg;base64,/9j/4AAQ..." or bare base64.
        let parts: Vec<&str> = base64_image.split(',').collect();
        let base64_data = if parts.len() > 1 { parts[1] } else { base64_image };

        let image_data = BASE64
            .decode(base64_data)
            .map_err(|_| UserError::InvalidImage)?;

        let file_ext = if base64_image.contains("image/png") {
            "png"
        } else if base64_image.contains("image/jpeg") || base64_image.contains("image/jpg") {
            "jpg"
        } else {
            "png"
        };

        let object_path = format!("profiles/{}/{}.{}", user_id, Uuid::new_v4(), file_ext);

        self.supabase
            .upload_object(
                &object_path,
                image_data,
                &format!("image/{}", file_ext),
                Some(auth_token),
            )
            .await
            .map_err(|e| UserError::Upload(e.to_string()))?;

        let public_url = self.supabase.public_storage_url(&object_path);

        let update_path = format!("/rest/v1/users?id=eq.{}", user_id);
        let _: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &update_path,
                Some(auth_token),
                Some(json!({
                    "image": public_url,
                    "updated_at": Utc::now().to_rfc3339()
                })),
                Some(SupabaseClient::returning_representation()),
            )
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(public_url)
    }
}
