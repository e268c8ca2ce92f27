use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::models::DoctorError;
use doctor_cell::services::{DoctorService, SlotService};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    Appointment, AppointmentError, BookAppointmentRequest, DoctorSnapshot, UserSnapshot,
};

/// Columns copied into the appointment's user snapshot; the hash column
/// is never read.
const USER_SNAPSHOT_COLUMNS: &str = "id,name,email,image,phone,address,gender,dob";

pub struct BookingService {
    supabase: SupabaseClient,
    doctors: DoctorService,
    slots: SlotService,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            doctors: DoctorService::new(config),
            slots: SlotService::new(config),
        }
    }

    /// Book (doctor, date, time) for the authenticated user. The slot is
    /// claimed through the conditional ledger write *before* the
    /// appointment row exists, so two racing bookings cannot both pass
    /// the availability check; a failed insert hands the slot back.
    pub async fn book_appointment(
        &self,
        user_id: &str,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for user {} with doctor {} at {} {}",
            user_id, request.doc_id, request.slot_date, request.slot_time
        );

        let doctor = self
            .doctors
            .get_doctor(request.doc_id, Some(auth_token))
            .await
            .map_err(map_doctor_error)?;

        if !doctor.available {
            return Err(AppointmentError::DoctorNotAvailable);
        }

        self.slots
            .claim_slot(
                &doctor,
                &request.slot_date,
                &request.slot_time,
                Some(auth_token),
            )
            .await
            .map_err(map_doctor_error)?;

        let user_data = match self.fetch_user_snapshot(user_id, auth_token).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.release_quietly(&request, auth_token).await;
                return Err(e);
            }
        };

        let appointment_data = json!({
            "user_id": user_id,
            "doc_id": request.doc_id,
            "slot_date": request.slot_date,
            "slot_time": request.slot_time,
            "user_data": user_data,
            "doc_data": DoctorSnapshot::from(&doctor),
            "amount": doctor.fees,
            "booked_at": Utc::now().to_rfc3339(),
            "cancelled": false
        });

        let inserted: Result<Vec<Value>, _> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(auth_token),
                Some(appointment_data),
                Some(SupabaseClient::returning_representation()),
            )
            .await;

        let rows = match inserted {
            Ok(rows) if !rows.is_empty() => rows,
            Ok(_) => {
                self.release_quietly(&request, auth_token).await;
                return Err(AppointmentError::DatabaseError(
                    "Failed to create appointment".to_string(),
                ));
            }
            Err(e) => {
                self.release_quietly(&request, auth_token).await;
                return Err(AppointmentError::DatabaseError(e.to_string()));
            }
        };

        let appointment: Appointment = serde_json::from_value(rows[0].clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))?;

        info!("Appointment {} booked", appointment.id);
        Ok(appointment)
    }

    /// Every appointment belonging to the user, unfiltered and
    /// unpaginated, in store order.
    pub async fn list_appointments(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments for user: {}", user_id);

        let path = format!("/rest/v1/appointments?user_id=eq.{}", user_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| {
                    AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e))
                })
            })
            .collect()
    }

    /// Soft-cancel: flag the row, then hand the slot back to the doctor's
    /// ledger as a separate write. Booked -> Cancelled is one-way.
    pub async fn cancel_appointment(
        &self,
        user_id: &str,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        debug!("Cancelling appointment: {}", appointment_id);

        let appointment = self.get_appointment(appointment_id, auth_token).await?;

        if appointment.user_id.to_string() != user_id {
            return Err(AppointmentError::Unauthorized);
        }
        if appointment.cancelled {
            return Err(AppointmentError::AlreadyCancelled);
        }

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let updated: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({ "cancelled": true })),
                Some(SupabaseClient::returning_representation()),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if updated.is_empty() {
            return Err(AppointmentError::DatabaseError(
                "Failed to cancel appointment".to_string(),
            ));
        }

        self.slots
            .release_slot(
                appointment.doc_id,
                &appointment.slot_date,
                &appointment.slot_time,
                Some(auth_token),
            )
            .await
            .map_err(map_doctor_error)?;

        info!("Appointment {} cancelled", appointment_id);
        Ok(())
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }

    async fn fetch_user_snapshot(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<UserSnapshot, AppointmentError> {
        let path = format!(
            "/rest/v1/users?id=eq.{}&select={}",
            user_id, USER_SNAPSHOT_COLUMNS
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(AppointmentError::UserNotFound);
        }

        serde_json::from_value(result[0].clone())
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse user: {}", e)))
    }

    async fn release_quietly(&self, request: &BookAppointmentRequest, auth_token: &str) {
        if let Err(e) = self
            .slots
            .release_slot(
                request.doc_id,
                &request.slot_date,
                &request.slot_time,
                Some(auth_token),
            )
            .await
        {
            warn!(
                "Failed to release slot after aborted booking for doctor {}: {}",
                request.doc_id, e
            );
        }
    }
}

fn map_doctor_error(error: DoctorError) -> AppointmentError {
    match error {
        DoctorError::NotFound => AppointmentError::DoctorNotFound,
        DoctorError::SlotTaken => AppointmentError::SlotNotAvailable,
        DoctorError::DatabaseError(msg) => AppointmentError::DatabaseError(msg),
    }
}
