use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub fees: f64,
    pub available: bool,
    pub image: String,
    pub slots_booked: BookedSlots,
}

/// Per-doctor ledger of taken slots: date-string -> list of time-strings.
/// A date whose last time is released keeps its (empty) list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookedSlots(HashMap<String, Vec<String>>);

impl BookedSlots {
    pub fn new(map: HashMap<String, Vec<String>>) -> Self {
        Self(map)
    }

    pub fn is_taken(&self, slot_date: &str, slot_time: &str) -> bool {
        self.0
            .get(slot_date)
            .map_or(false, |times| times.iter().any(|t| t == slot_time))
    }

    pub fn times_for(&self, slot_date: &str) -> Option<&[String]> {
        self.0.get(slot_date).map(|times| times.as_slice())
    }

    /// Copy of the ledger with the slot added (list created on first
    /// booking of a date).
    pub fn with_claimed(&self, slot_date: &str, slot_time: &str) -> BookedSlots {
        let mut next = self.0.clone();
        next.entry(slot_date.to_string())
            .or_default()
            .push(slot_time.to_string());
        BookedSlots(next)
    }

    /// Copy of the ledger with the slot filtered out of its date's list.
    pub fn with_released(&self, slot_date: &str, slot_time: &str) -> BookedSlots {
        let mut next = self.0.clone();
        if let Some(times) = next.get_mut(slot_date) {
            times.retain(|t| t != slot_time);
        }
        BookedSlots(next)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Slot Not Available")]
    SlotTaken,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
