use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Columns safe to hand back to the caller; the password hash is never
/// selected.
pub const PROFILE_COLUMNS: &str = "id,name,email,image,phone,address,gender,dob";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: String,
}

/// Full row in the users table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub image: String,
    pub phone: String,
    pub address: Address,
    pub gender: String,
    pub dob: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outward projection of a user row, hash excluded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: String,
    pub phone: String,
    pub address: Address,
    pub gender: String,
    pub dob: String,
}

/// Fields are optional so absence surfaces as the product's "Missing
/// Details" failure instead of a deserialization rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `address` arrives as a serialized JSON string and is parsed server
/// side; `image` is an optional base64 data URI for the avatar upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UserError {
    #[error("Missing Details")]
    MissingDetails,

    #[error("Enter a valid Email")]
    InvalidEmail,

    #[error("Enter a Strong Password")]
    WeakPassword,

    #[error("User already exists")]
    AlreadyExists,

    #[error("User does not exist")]
    NotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Data Missing")]
    DataMissing,

    #[error("Invalid address format")]
    InvalidAddress,

    #[error("Invalid image data")]
    InvalidImage,

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<UserRecord> for UserProfile {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            image: record.image,
            phone: record.phone,
            address: record.address,
            gender: record.gender,
            dob: record.dob,
        }
    }
}
