use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Address, UpdateProfileRequest, UserError, UserProfile, PROFILE_COLUMNS};

pub struct ProfileService {
    supabase: SupabaseClient,
}

impl ProfileService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_profile(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<UserProfile, UserError> {
        debug!("Fetching profile for user: {}", user_id);

        let path = format!(
            "/rest/v1/users?id=eq.{}&select={}",
            user_id, PROFILE_COLUMNS
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(UserError::NotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| UserError::DatabaseError(format!("Failed to parse profile: {}", e)))
    }

    /// Profile-field write. The avatar, when present, is a separate second
    /// write performed by `AvatarService` after this one lands.
    pub async fn update_profile(
        &self,
        user_id: &str,
        request: &UpdateProfileRequest,
        auth_token: &str,
    ) -> Result<(), UserError> {
        let name = request.name.as_deref().filter(|s| !s.trim().is_empty());
        let phone = request.phone.as_deref().filter(|s| !s.trim().is_empty());
        let dob = request.dob.as_deref().filter(|s| !s.trim().is_empty());
        let gender = request.gender.as_deref().filter(|s| !s.trim().is_empty());

        let (name, phone, dob, gender) = match (name, phone, dob, gender) {
            (Some(n), Some(p), Some(d), Some(g)) => (n, p, d, g),
            _ => return Err(UserError::DataMissing),
        };

        // Parse before any write so malformed input performs none.
        let address: Address = match &request.address {
            Some(raw) => serde_json::from_str(raw).map_err(|_| UserError::InvalidAddress)?,
            None => Address::default(),
        };

        debug!("Updating profile for user: {}", user_id);

        let update_data = json!({
            "name": name,
            "phone": phone,
            "dob": dob,
            "gender": gender,
            "address": address,
            "updated_at": Utc::now().to_rfc3339()
        });

        let path = format!("/rest/v1/users?id=eq.{}", user_id);
        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(update_data),
                Some(SupabaseClient::returning_representation()),
            )
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(UserError::NotFound);
        }

        Ok(())
    }
}
