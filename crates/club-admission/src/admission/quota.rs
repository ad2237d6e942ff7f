use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{birthday_falls_on, Guest, Titular};
use super::error::AdmissionError;

/// Birthday-guest allowance for a family group on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaSummary {
    pub date: NaiveDate,
    pub birthday_members: u32,
    pub total_quota: u32,
    pub used: u32,
    pub remaining: u32,
    pub restricted: bool,
}

/// Recomputes the quota from the list's current flags on every call; nothing is persisted.
#[derive(Debug, Clone, Copy)]
pub struct QuotaAllocator {
    guests_per_member: u32,
}

impl Default for QuotaAllocator {
    fn default() -> Self {
        Self::new(15)
    }
}

impl QuotaAllocator {
    pub fn new(guests_per_member: u32) -> Self {
        Self { guests_per_member }
    }

    /// Titular and family members whose birthday is `date`.
    pub fn birthday_members(titular: &Titular, date: NaiveDate) -> u32 {
        titular
            .family_birth_dates()
            .filter(|birth_date| birthday_falls_on(*birth_date, date))
            .count() as u32
    }

    /// Guests currently flagged as birthday guests, optionally ignoring one DNI.
    pub fn used(guests: &[Guest], excluding: Option<&str>) -> u32 {
        guests
            .iter()
            .filter(|guest| guest.is_birthday_guest)
            .filter(|guest| excluding != Some(guest.dni.as_str()))
            .count() as u32
    }

    pub fn allocate(
        &self,
        date: NaiveDate,
        birthday_members: u32,
        used: u32,
        restricted: bool,
    ) -> QuotaSummary {
        let total_quota = if restricted {
            0
        } else {
            birthday_members.saturating_mul(self.guests_per_member)
        };

        QuotaSummary {
            date,
            birthday_members,
            total_quota,
            used,
            remaining: total_quota.saturating_sub(used),
            restricted,
        }
    }

    pub fn summarize(
        &self,
        titular: &Titular,
        date: NaiveDate,
        guests: &[Guest],
        restricted: bool,
    ) -> QuotaSummary {
        self.allocate(
            date,
            Self::birthday_members(titular, date),
            Self::used(guests, None),
            restricted,
        )
    }

    /// Check-then-act guard for flagging one more birthday guest. Not a reservation.
    pub fn ensure_slot(&self, summary: &QuotaSummary) -> Result<(), AdmissionError> {
        if summary.restricted {
            return Err(AdmissionError::RestrictedDate(summary.date));
        }

        if summary.used >= summary.total_quota {
            return Err(AdmissionError::QuotaExceeded {
                total: summary.total_quota,
                used: summary.used,
            });
        }

        Ok(())
    }
}
