use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{BookedSlots, Doctor, DoctorError};
use crate::services::doctor::DoctorService;

/// Claim and release of booked slots. Both writes are conditional on the
/// prior state of the date's slot list, so concurrent writers cannot both
/// land: the store evaluates filter + update as one statement, and the
/// loser's update matches zero rows.
pub struct SlotService {
    supabase: SupabaseClient,
    doctors: DoctorService,
}

impl SlotService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            doctors: DoctorService::new(config),
        }
    }

    /// Claim (doctor, date, time). Fails with `SlotTaken` when the time is
    /// already in the list, or when a concurrent claim wins the write.
    pub async fn claim_slot(
        &self,
        doctor: &Doctor,
        slot_date: &str,
        slot_time: &str,
        auth_token: Option<&str>,
    ) -> Result<BookedSlots, DoctorError> {
        if doctor.slots_booked.is_taken(slot_date, slot_time) {
            return Err(DoctorError::SlotTaken);
        }

        let next = doctor.slots_booked.with_claimed(slot_date, slot_time);
        let rows = self
            .write_slots(
                doctor.id,
                slot_date,
                doctor.slots_booked.times_for(slot_date),
                &next,
                auth_token,
            )
            .await?;

        if rows.is_empty() {
            // A concurrent booking moved the list between our read and
            // the conditional write.
            debug!(
                "Lost conditional slot claim for doctor {} at {} {}",
                doctor.id, slot_date, slot_time
            );
            return Err(DoctorError::SlotTaken);
        }

        Ok(next)
    }

    /// Remove (date, time) from the doctor's ledger. Retries once with a
    /// fresh read when a concurrent write invalidates the guard; already-
    /// absent slots are a successful no-op. An emptied list is kept.
    pub async fn release_slot(
        &self,
        doctor_id: Uuid,
        slot_date: &str,
        slot_time: &str,
        auth_token: Option<&str>,
    ) -> Result<BookedSlots, DoctorError> {
        for attempt in 0..2 {
            let doctor = self.doctors.get_doctor(doctor_id, auth_token).await?;

            if !doctor.slots_booked.is_taken(slot_date, slot_time) {
                return Ok(doctor.slots_booked);
            }

            let next = doctor.slots_booked.with_released(slot_date, slot_time);
            let rows = self
                .write_slots(
                    doctor_id,
                    slot_date,
                    doctor.slots_booked.times_for(slot_date),
                    &next,
                    auth_token,
                )
                .await?;

            if !rows.is_empty() {
                return Ok(next);
            }

            warn!(
                "Lost conditional slot release for doctor {} at {} {} (attempt {})",
                doctor_id, slot_date, slot_time, attempt
            );
        }

        Err(DoctorError::DatabaseError(
            "Could not release slot after concurrent updates".to_string(),
        ))
    }

    async fn write_slots(
        &self,
        doctor_id: Uuid,
        slot_date: &str,
        prior_times: Option<&[String]>,
        next: &BookedSlots,
        auth_token: Option<&str>,
    ) -> Result<Vec<Value>, DoctorError> {
        let path = format!(
            "/rest/v1/doctors?id=eq.{}&{}",
            doctor_id,
            Self::slot_guard(slot_date, prior_times)
        );

        self.supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                auth_token,
                Some(json!({ "slots_booked": next })),
                Some(SupabaseClient::returning_representation()),
            )
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))
    }

    /// Filter pinning the prior value of the date's list: `is.null` when
    /// the date had no entry, text equality on the jsonb list otherwise.
    fn slot_guard(slot_date: &str, prior_times: Option<&[String]>) -> String {
        match prior_times {
            None => format!(
                "slots_booked->>{}=is.null",
                urlencoding::encode(slot_date)
            ),
            Some(times) => format!(
                "slots_booked->>{}=eq.{}",
                urlencoding::encode(slot_date),
                urlencoding::encode(&Self::jsonb_array_text(times))
            ),
        }
    }

    /// jsonb's canonical text rendering of a string array (", " between
    /// elements), which is what `->>` yields for comparison.
    fn jsonb_array_text(times: &[String]) -> String {
        let parts: Vec<String> = times.iter().map(|t| json!(t).to_string()).collect();
        format!("[{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_for_a_fresh_date_requires_absence() {
        let guard = SlotService::slot_guard("12_8_2026", None);
        assert_eq!(guard, "slots_booked->>12_8_2026=is.null");
    }

    #[test]
    fn guard_for_an_existing_date_pins_the_list() {
        let times = vec!["10:00".to_string(), "11:00".to_string()];
        let guard = SlotService::slot_guard("12_8_2026", Some(&times));
        assert_eq!(
            guard,
            format!(
                "slots_booked->>12_8_2026=eq.{}",
                urlencoding::encode(r#"["10:00", "11:00"]"#)
            )
        );
    }
}
