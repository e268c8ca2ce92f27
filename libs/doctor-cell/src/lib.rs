pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{BookedSlots, Doctor, DoctorError};
pub use router::doctor_routes;
