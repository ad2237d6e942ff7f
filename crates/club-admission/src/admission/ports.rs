use std::collections::BTreeSet;
use std::sync::RwLock;

use chrono::{Local, NaiveDate};

use super::domain::{DailyGuestList, Titular, TitularId};

/// Document store keyed by `(titular_id, date)`.
///
/// The engine always reads the full list, applies a pure transition and writes the full list
/// back, so adapters can layer conditional writes or transactions on `put`.
pub trait GuestListStore: Send + Sync {
    fn get(
        &self,
        titular_id: &TitularId,
        date: NaiveDate,
    ) -> Result<Option<DailyGuestList>, StoreError>;
    fn put(&self, list: DailyGuestList) -> Result<DailyGuestList, StoreError>;
}

/// Read-only view of members with their embedded family and adherents.
pub trait MemberDirectory: Send + Sync {
    fn get_titular(&self, id: &TitularId) -> Result<Option<Titular>, StoreError>;
}

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Calendar of dates on which birthday-guest admissions are disabled.
pub trait RestrictedDatesPolicy: Send + Sync {
    fn is_restricted(&self, date: NaiveDate) -> bool;
}

/// Opaque store adapter failure. Retries, if any, belong to the adapter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("concurrent write conflict")]
    Conflict,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Settable clock for demos and tests.
#[derive(Debug)]
pub struct FixedClock {
    today: RwLock<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: RwLock::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        let mut guard = self.today.write().unwrap_or_else(|err| err.into_inner());
        *guard = today;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.read().unwrap_or_else(|err| err.into_inner())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestrictedDates {
    dates: BTreeSet<NaiveDate>,
}

impl RestrictedDates {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.dates.iter()
    }
}

impl RestrictedDatesPolicy for RestrictedDates {
    fn is_restricted(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}
