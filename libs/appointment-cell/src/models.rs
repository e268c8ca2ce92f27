use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use doctor_cell::models::Doctor;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub doc_id: Uuid,
    pub slot_date: String,
    pub slot_time: String,
    pub user_data: UserSnapshot,
    pub doc_data: DoctorSnapshot,
    pub amount: f64,
    pub booked_at: DateTime<Utc>,
    pub cancelled: bool,
}

/// Point-in-time copy of the booking user, embedded in the appointment
/// row. A later profile edit does not rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: String,
    pub phone: String,
    pub address: Value,
    pub gender: String,
    pub dob: String,
}

/// Point-in-time copy of the doctor, slot ledger excluded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSnapshot {
    pub id: Uuid,
    pub name: String,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub fees: f64,
    pub available: bool,
    pub image: String,
}

impl From<&Doctor> for DoctorSnapshot {
    fn from(doctor: &Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name.clone(),
            speciality: doctor.speciality.clone(),
            degree: doctor.degree.clone(),
            experience: doctor.experience.clone(),
            about: doctor.about.clone(),
            fees: doctor.fees,
            available: doctor.available,
            image: doctor.image.clone(),
        }
    }
}

/// The booking user comes from the authenticated context, never the body.
#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub doc_id: Uuid,
    pub slot_date: String,
    pub slot_time: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Doctor Not Available")]
    DoctorNotAvailable,

    #[error("Slot Not Available")]
    SlotNotAvailable,

    #[error("Appointment not found")]
    NotFound,

    #[error("Unauthorized action")]
    Unauthorized,

    #[error("Appointment already cancelled")]
    AlreadyCancelled,

    #[error("User does not exist")]
    UserNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
