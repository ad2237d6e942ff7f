use chrono::NaiveDate;

use super::domain::{GuestListKey, GuestListState, TitularId};
use super::eligibility::EntryDenial;
use super::ports::StoreError;

/// Business-rule rejections and store failures surfaced by the admission engine.
///
/// Every rejection leaves the stored list untouched.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("{0}")]
    Validation(String),
    #[error("a responsible member must enter before guests can be admitted")]
    GateClosed,
    #[error("birthday guest quota exhausted ({used} of {total} used)")]
    QuotaExceeded { total: u32, used: u32 },
    #[error("birthday guest admissions are disabled on {0}")]
    RestrictedDate(NaiveDate),
    #[error("a payment method is required for paying guests")]
    PaymentMethodRequired,
    #[error("guest list for {date} cannot be edited while {state}")]
    NotEditable {
        date: NaiveDate,
        state: GuestListState,
    },
    #[error("guest list for {date} cannot be sent while {state} (window {window_days} days)")]
    NotSendable {
        date: NaiveDate,
        state: GuestListState,
        window_days: u32,
    },
    #[error("cannot {action} a guest list while {from}")]
    InvalidTransition {
        from: GuestListState,
        action: &'static str,
    },
    #[error("entry denied: {0}")]
    EntryDenied(EntryDenial),
    #[error("guest {0} has already entered")]
    AlreadyEntered(String),
    #[error("guest {0} has not entered")]
    NotEntered(String),
    #[error("no guest list for {0}")]
    ListNotFound(GuestListKey),
    #[error("guest {0} is not on the list")]
    GuestNotFound(String),
    #[error("titular {0} not found")]
    TitularNotFound(TitularId),
    #[error("no member with DNI {dni} in titular {titular_id}'s group")]
    PersonNotFound { titular_id: TitularId, dni: String },
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

impl AdmissionError {
    /// Stable machine-readable discriminator for API payloads.
    pub const fn kind(&self) -> &'static str {
        match self {
            AdmissionError::Validation(_) => "validation_error",
            AdmissionError::GateClosed => "gate_closed",
            AdmissionError::QuotaExceeded { .. } => "quota_exceeded",
            AdmissionError::RestrictedDate(_) => "restricted_date",
            AdmissionError::PaymentMethodRequired => "payment_method_required",
            AdmissionError::NotEditable { .. } => "not_editable",
            AdmissionError::NotSendable { .. } => "not_sendable",
            AdmissionError::InvalidTransition { .. } => "invalid_transition",
            AdmissionError::EntryDenied(_) => "entry_denied",
            AdmissionError::AlreadyEntered(_) => "already_entered",
            AdmissionError::NotEntered(_) => "not_entered",
            AdmissionError::ListNotFound(_) => "list_not_found",
            AdmissionError::GuestNotFound(_) => "guest_not_found",
            AdmissionError::TitularNotFound(_) => "titular_not_found",
            AdmissionError::PersonNotFound { .. } => "person_not_found",
            AdmissionError::Persistence(_) => "persistence_failure",
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        AdmissionError::Validation(message.into())
    }
}
