use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::FitnessRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessState {
    Valid,
    Expired,
    Invalid,
    Pending,
}

impl FitnessState {
    pub const fn label(self) -> &'static str {
        match self {
            FitnessState::Valid => "valid",
            FitnessState::Expired => "expired",
            FitnessState::Invalid => "invalid",
            FitnessState::Pending => "pending",
        }
    }
}

/// Display/validity snapshot of a medical-fitness record. Presentation only, never an entry gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitnessStatus {
    pub status: FitnessState,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
    pub near_expiry: bool,
}

impl FitnessStatus {
    fn without_window(status: FitnessState, message: String) -> Self {
        Self {
            status,
            message,
            days_remaining: None,
            near_expiry: false,
        }
    }
}

/// Stateless evaluator; `warning_days` only drives the near-expiry flag.
#[derive(Debug, Clone, Copy)]
pub struct FitnessEvaluator {
    warning_days: i64,
}

impl Default for FitnessEvaluator {
    fn default() -> Self {
        Self::new(7)
    }
}

impl FitnessEvaluator {
    pub fn new(warning_days: u32) -> Self {
        Self {
            warning_days: i64::from(warning_days),
        }
    }

    pub fn evaluate(&self, record: Option<&FitnessRecord>, today: NaiveDate) -> FitnessStatus {
        let Some(record) = record else {
            return FitnessStatus::without_window(
                FitnessState::Pending,
                "medical fitness pending: no record on file".to_string(),
            );
        };

        if !record.valid {
            let reason = record
                .invalidity_reason
                .as_deref()
                .map(str::trim)
                .filter(|reason| !reason.is_empty())
                .unwrap_or("reason not specified");
            return FitnessStatus::without_window(
                FitnessState::Invalid,
                format!("medical fitness invalid: {reason}"),
            );
        }

        let Some(expires_at) = record.expires_at else {
            return FitnessStatus::without_window(
                FitnessState::Valid,
                "medical fitness valid with no expiry date".to_string(),
            );
        };

        // The expiry day itself is still covered.
        if today > expires_at {
            return FitnessStatus::without_window(
                FitnessState::Expired,
                format!("medical fitness expired on {expires_at}"),
            );
        }

        let days_remaining = (expires_at - today).num_days();
        let near_expiry = days_remaining <= self.warning_days;
        let message = match days_remaining {
            0 => format!("medical fitness valid, expires today ({expires_at})"),
            days if near_expiry => {
                format!("medical fitness valid, expires in {days} day(s) on {expires_at}")
            }
            _ => format!("medical fitness valid until {expires_at}"),
        };

        FitnessStatus {
            status: FitnessState::Valid,
            message,
            days_remaining: Some(days_remaining),
            near_expiry,
        }
    }
}
