//! Admission and guest-quota engine.
//!
//! Decides whether a titular, family member, adherent or daily guest may enter the club on a
//! given day, and drives the lifecycle of each titular's daily guest list from draft to
//! processed entry. Every write follows read-full-list, apply-pure-transition, write-full-list so
//! the backing store can add optimistic concurrency per `(titular_id, date)` key.

mod config;
pub mod domain;
pub(crate) mod eligibility;
mod error;
pub(crate) mod fitness;
pub(crate) mod guest_list;
pub mod ports;
pub(crate) mod quota;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use config::AdmissionConfig;
pub use domain::{
    age_on, birthday_falls_on, Adherent, AdherentStatus, DailyGuestList, Entrant, EntrantRole,
    FamilyMember, FitnessRecord, Guest, GuestListKey, GuestListState, GuestRegistration,
    MemberStatus, PaymentMethod, Titular, TitularId,
};
pub use eligibility::{resolve_entry, EntryDecision, EntryDenial};
pub use error::AdmissionError;
pub use fitness::{FitnessEvaluator, FitnessState, FitnessStatus};
pub use guest_list::CancelledBy;
pub use ports::{
    Clock, FixedClock, GuestListStore, MemberDirectory, RestrictedDates, RestrictedDatesPolicy,
    StoreError, SystemClock,
};
pub use quota::{QuotaAllocator, QuotaSummary};
pub use router::admission_router;
pub use service::{
    AdmissionRequest, AdmissionService, GuestAdmission, GuestListView, MemberEntry,
};
