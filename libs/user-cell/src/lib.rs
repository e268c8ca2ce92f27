pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Address, RegisterRequest, UpdateProfileRequest, UserError, UserProfile, UserRecord};
pub use router::user_routes;
