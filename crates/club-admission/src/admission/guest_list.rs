use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::{DailyGuestList, Guest, GuestListKey, GuestListState, GuestRegistration};
use super::error::AdmissionError;

/// Which actor cancelled a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelledBy {
    Member,
    Admin,
}

impl DailyGuestList {
    /// Fresh draft list for `key`. Also stands in for "no list yet" when evaluating rules.
    pub fn new(key: &GuestListKey) -> Self {
        Self {
            id: key.list_id(),
            titular_id: key.titular_id.clone(),
            date: key.date,
            guests: Vec::new(),
            state: GuestListState::Draft,
            responding_member_has_entered: false,
            member_entries: BTreeSet::new(),
        }
    }

    pub fn key(&self) -> GuestListKey {
        GuestListKey::new(self.titular_id.clone(), self.date)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            self.state,
            GuestListState::CancelledByMember | GuestListState::CancelledByAdmin
        )
    }

    /// Fresh draft replacing a cancelled list. Member entries carry over so the gate stays open.
    pub fn reopened(&self) -> Self {
        Self {
            responding_member_has_entered: self.responding_member_has_entered,
            member_entries: self.member_entries.clone(),
            ..Self::new(&self.key())
        }
    }

    /// Apply the lazy expiry transition. Returns `true` when the state changed.
    pub fn refresh(&mut self, today: NaiveDate) -> bool {
        let expirable = matches!(self.state, GuestListState::Draft | GuestListState::Sent);
        if expirable && self.date < today {
            self.state = GuestListState::Expired;
            return true;
        }
        false
    }

    pub fn is_editable(&self, today: NaiveDate) -> bool {
        self.date >= today && !self.state.is_terminal()
    }

    /// A window reaching past the calendar's end has no upper bound.
    pub fn is_sendable(&self, today: NaiveDate, window_days: u32) -> bool {
        let within_window = today
            .checked_add_signed(Duration::days(i64::from(window_days)))
            .map_or(true, |last| self.date <= last);

        self.is_editable(today)
            && within_window
            && matches!(self.state, GuestListState::Draft | GuestListState::Sent)
    }

    pub fn ensure_editable(&self, today: NaiveDate) -> Result<(), AdmissionError> {
        if self.is_editable(today) {
            Ok(())
        } else {
            Err(AdmissionError::NotEditable {
                date: self.date,
                state: self.state,
            })
        }
    }

    /// Draft -> Sent, or Sent -> Sent for amendments.
    pub fn send(&mut self, today: NaiveDate, window_days: u32) -> Result<(), AdmissionError> {
        self.ensure_editable(today)?;

        if !self.is_sendable(today, window_days) {
            return Err(AdmissionError::NotSendable {
                date: self.date,
                state: self.state,
                window_days,
            });
        }

        if !self.guests.iter().any(Guest::is_complete) {
            return Err(AdmissionError::validation(
                "empty list: add at least one guest with name, surname and DNI",
            ));
        }

        self.state = GuestListState::Sent;
        Ok(())
    }

    pub fn cancel(&mut self, by: CancelledBy) -> Result<(), AdmissionError> {
        if self.state.is_terminal() {
            return Err(AdmissionError::InvalidTransition {
                from: self.state,
                action: "cancel",
            });
        }

        self.state = match by {
            CancelledBy::Member => GuestListState::CancelledByMember,
            CancelledBy::Admin => GuestListState::CancelledByAdmin,
        };
        Ok(())
    }

    pub fn process(&mut self) -> Result<(), AdmissionError> {
        if self.state != GuestListState::Sent {
            return Err(AdmissionError::InvalidTransition {
                from: self.state,
                action: "process",
            });
        }

        self.state = GuestListState::Processed;
        Ok(())
    }

    pub fn add_guest(
        &mut self,
        registration: GuestRegistration,
        today: NaiveDate,
    ) -> Result<(), AdmissionError> {
        self.ensure_editable(today)?;
        validate_registration(&registration)?;

        let guest = Guest::from(registration);
        if self.guest(&guest.dni).is_some() {
            return Err(AdmissionError::validation(format!(
                "guest {} is already on the list",
                guest.dni
            )));
        }

        self.guests.push(guest);
        Ok(())
    }

    pub fn remove_guest(&mut self, dni: &str, today: NaiveDate) -> Result<Guest, AdmissionError> {
        self.ensure_editable(today)?;

        let position = self
            .guests
            .iter()
            .position(|guest| guest.dni == dni)
            .ok_or_else(|| AdmissionError::GuestNotFound(dni.to_string()))?;

        if self.guests[position].entered {
            return Err(AdmissionError::AlreadyEntered(dni.to_string()));
        }

        Ok(self.guests.remove(position))
    }

    /// Opens the responsible-entry gate. Monotonic for the day.
    pub fn record_member_entry(&mut self, dni: &str) {
        self.responding_member_has_entered = true;
        self.member_entries.insert(dni.trim().to_string());
    }

    pub fn ensure_gate_open(&self) -> Result<(), AdmissionError> {
        if self.responding_member_has_entered {
            Ok(())
        } else {
            Err(AdmissionError::GateClosed)
        }
    }

    pub fn guest(&self, dni: &str) -> Option<&Guest> {
        self.guests.iter().find(|guest| guest.dni == dni)
    }

    pub fn guest_mut(&mut self, dni: &str) -> Result<&mut Guest, AdmissionError> {
        self.guests
            .iter_mut()
            .find(|guest| guest.dni == dni)
            .ok_or_else(|| AdmissionError::GuestNotFound(dni.to_string()))
    }
}

fn validate_registration(registration: &GuestRegistration) -> Result<(), AdmissionError> {
    if registration.first_name.trim().is_empty() {
        return Err(AdmissionError::validation("guest name is required"));
    }
    if registration.last_name.trim().is_empty() {
        return Err(AdmissionError::validation("guest surname is required"));
    }

    let dni = registration.dni.trim();
    if dni.is_empty() {
        return Err(AdmissionError::validation("guest DNI is required"));
    }
    if !dni.chars().all(|c| c.is_ascii_digit()) {
        return Err(AdmissionError::validation(format!(
            "guest DNI must be numeric, got '{dni}'"
        )));
    }

    Ok(())
}
