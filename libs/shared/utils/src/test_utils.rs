use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::AuthUser;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }

    /// Config pointing at a mock store, usually a wiremock server.
    pub fn with_store_url(url: &str) -> AppConfig {
        AppConfig {
            supabase_url: url.to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            supabase_jwt_secret: TestConfig::default().jwt_secret,
        }
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "patient".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn to_auth_user(&self) -> AuthUser {
        AuthUser {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Canned store rows matching the users/doctors/appointments tables.
pub struct MockStoreRows;

impl MockStoreRows {
    pub fn user_row(user_id: &str, password_hash: &str) -> serde_json::Value {
        json!({
            "id": user_id,
            "name": "Test User",
            "email": "test@example.com",
            "password_hash": password_hash,
            "image": "http://localhost:54321/storage/v1/object/public/profiles/default.png",
            "phone": "0000000000",
            "address": { "line1": "", "line2": "" },
            "gender": "Not Selected",
            "dob": "Not Selected",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn user_profile_row(user_id: &str) -> serde_json::Value {
        json!({
            "id": user_id,
            "name": "Test User",
            "email": "test@example.com",
            "image": "http://localhost:54321/storage/v1/object/public/profiles/default.png",
            "phone": "0000000000",
            "address": { "line1": "", "line2": "" },
            "gender": "Not Selected",
            "dob": "Not Selected"
        })
    }

    pub fn doctor_row(doctor_id: &str) -> serde_json::Value {
        Self::doctor_row_with_slots(doctor_id, json!({}))
    }

    pub fn doctor_row_with_slots(doctor_id: &str, slots_booked: serde_json::Value) -> serde_json::Value {
        json!({
            "id": doctor_id,
            "name": "Dr. Richard James",
            "speciality": "General physician",
            "degree": "MBBS",
            "experience": "4 Years",
            "about": "Dr. James has a strong commitment to delivering comprehensive medical care.",
            "fees": 50.0,
            "available": true,
            "image": "http://localhost:54321/storage/v1/object/public/doctors/doc1.png",
            "slots_booked": slots_booked
        })
    }

    pub fn appointment_row(
        appointment_id: &str,
        user_id: &str,
        doc_id: &str,
        slot_date: &str,
        slot_time: &str,
        cancelled: bool,
    ) -> serde_json::Value {
        json!({
            "id": appointment_id,
            "user_id": user_id,
            "doc_id": doc_id,
            "slot_date": slot_date,
            "slot_time": slot_time,
            "user_data": {
                "id": user_id,
                "name": "Test User",
                "email": "test@example.com",
                "image": "http://localhost:54321/storage/v1/object/public/profiles/default.png",
                "phone": "0000000000",
                "address": { "line1": "", "line2": "" },
                "gender": "Not Selected",
                "dob": "Not Selected"
            },
            "doc_data": {
                "id": doc_id,
                "name": "Dr. Richard James",
                "speciality": "General physician",
                "degree": "MBBS",
                "experience": "4 Years",
                "about": "Dr. James has a strong commitment to delivering comprehensive medical care.",
                "fees": 50.0,
                "available": true,
                "image": "http://localhost:54321/storage/v1/object/public/doctors/doc1.png"
            },
            "amount": 50.0,
            "booked_at": "2026-08-07T10:00:00Z",
            "cancelled": cancelled
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "error": {
                "message": message,
                "code": code
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert!(!app_config.supabase_jwt_secret.is_empty());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::patient("pat@example.com");
        assert_eq!(user.email, "pat@example.com");
        assert_eq!(user.role, "patient");

        let auth_user = user.to_auth_user();
        assert_eq!(auth_user.email, Some(user.email.clone()));
        assert_eq!(auth_user.role, Some(user.role.clone()));
        assert_eq!(auth_user.id, user.id);
    }

    #[test]
    fn test_jwt_token_creation() {
        let user = TestUser::default();
        let token = JwtTestUtils::create_test_token(&user, "test-secret", Some(1));

        assert_eq!(token.split('.').count(), 3);
    }
}
