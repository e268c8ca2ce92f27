use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_utils::validation::is_valid_email;

use crate::models::{LoginRequest, RegisterRequest, UserError, UserRecord};

const MIN_PASSWORD_LENGTH: usize = 8;

pub struct AccountService {
    supabase: SupabaseClient,
}

impl AccountService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    pub fn verify_password(
        password: &str,
        hash: &str,
    ) -> Result<bool, argon2::password_hash::Error> {
        let parsed_hash = PasswordHash::new(hash)?;
        let argon2 = Argon2::default();

        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<UserRecord, UserError> {
        let name = non_empty(request.name).ok_or(UserError::MissingDetails)?;
        let email = non_empty(request.email).ok_or(UserError::MissingDetails)?;
        let password = non_empty(request.password).ok_or(UserError::MissingDetails)?;

        if !is_valid_email(&email) {
            return Err(UserError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(UserError::WeakPassword);
        }

        debug!("Registering new user: {}", email);

        let existing_path = format!(
            "/rest/v1/users?email=eq.{}&select=id",
            urlencoding::encode(&email)
        );
        let existing: Vec<Value> = self
            .supabase
            .request(Method::GET, &existing_path, None, None)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if !existing.is_empty() {
            return Err(UserError::AlreadyExists);
        }

        let password_hash =
            Self::hash_password(&password).map_err(|e| UserError::Hashing(e.to_string()))?;

        // Profile fields start as placeholders until the first profile
        // update fills them in.
        let user_data = json!({
            "name": name,
            "email": email,
            "password_hash": password_hash,
            "image": self.supabase.public_storage_url("profiles/default.png"),
            "phone": "0000000000",
            "address": { "line1": "", "line2": "" },
            "gender": "Not Selected",
            "dob": "Not Selected",
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/users",
                None,
                Some(user_data),
                Some(SupabaseClient::returning_representation()),
            )
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(UserError::DatabaseError("Failed to create user".to_string()));
        }

        let user: UserRecord = serde_json::from_value(result[0].clone())
            .map_err(|e| UserError::DatabaseError(format!("Failed to parse user: {}", e)))?;

        debug!("User registered with id: {}", user.id);
        Ok(user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<UserRecord, UserError> {
        debug!("Login attempt for: {}", request.email);

        let path = format!(
            "/rest/v1/users?email=eq.{}",
            urlencoding::encode(&request.email)
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(UserError::NotFound);
        }

        let user: UserRecord = serde_json::from_value(result[0].clone())
            .map_err(|e| UserError::DatabaseError(format!("Failed to parse user: {}", e)))?;

        let matches = Self::verify_password(&request.password, &user.password_hash)
            .map_err(|e| UserError::Hashing(e.to_string()))?;

        if !matches {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}
