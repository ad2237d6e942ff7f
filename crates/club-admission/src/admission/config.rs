use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Rule dials for the admission engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionConfig {
    pub birthday_guests_per_member: u32,
    pub pre_registration_days: u32,
    pub fitness_warning_days: u32,
    pub free_entry_age: u32,
    #[serde(default)]
    pub restricted_dates: Vec<NaiveDate>,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            birthday_guests_per_member: 15,
            pre_registration_days: 5,
            fitness_warning_days: 7,
            free_entry_age: 3,
            restricted_dates: Vec::new(),
        }
    }
}
