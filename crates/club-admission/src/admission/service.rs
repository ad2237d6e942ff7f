use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::config::AdmissionConfig;
use super::domain::{
    age_on, DailyGuestList, GuestListKey, GuestListState, GuestRegistration, PaymentMethod,
    Titular, TitularId,
};
use super::eligibility::{resolve_entry, EntryDecision};
use super::error::AdmissionError;
use super::fitness::FitnessEvaluator;
use super::guest_list::CancelledBy;
use super::ports::{Clock, GuestListStore, MemberDirectory, RestrictedDates, RestrictedDatesPolicy};
use super::quota::{QuotaAllocator, QuotaSummary};

/// Operator's classification choices when admitting a guest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionRequest {
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub birthday_guest: bool,
}

/// How an admitted guest was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GuestAdmission {
    FreeUnderAge,
    Birthday,
    Paid { method: PaymentMethod },
}

/// Result of recording a member at the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberEntry {
    pub decision: EntryDecision,
    pub list: DailyGuestList,
}

/// Guest list as reported to callers: lazily expired, with derived rule flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuestListView {
    #[serde(flatten)]
    pub list: DailyGuestList,
    pub editable: bool,
    pub sendable: bool,
    pub quota: QuotaSummary,
}

/// Orchestrator composing the fitness evaluator, quota allocator, eligibility resolver and the
/// guest-list state machine over the store and directory ports.
pub struct AdmissionService<S, D> {
    store: Arc<S>,
    directory: Arc<D>,
    clock: Arc<dyn Clock>,
    restricted: Arc<dyn RestrictedDatesPolicy>,
    config: AdmissionConfig,
    fitness: FitnessEvaluator,
    quota: QuotaAllocator,
}

impl<S, D> AdmissionService<S, D>
where
    S: GuestListStore + 'static,
    D: MemberDirectory + 'static,
{
    pub fn new(
        store: Arc<S>,
        directory: Arc<D>,
        clock: Arc<dyn Clock>,
        config: AdmissionConfig,
    ) -> Self {
        let restricted = Arc::new(RestrictedDates::new(
            config.restricted_dates.iter().copied(),
        ));
        Self::with_policy(store, directory, clock, restricted, config)
    }

    pub fn with_policy(
        store: Arc<S>,
        directory: Arc<D>,
        clock: Arc<dyn Clock>,
        restricted: Arc<dyn RestrictedDatesPolicy>,
        config: AdmissionConfig,
    ) -> Self {
        let fitness = FitnessEvaluator::new(config.fitness_warning_days);
        let quota = QuotaAllocator::new(config.birthday_guests_per_member);

        Self {
            store,
            directory,
            clock,
            restricted,
            config,
            fitness,
            quota,
        }
    }

    pub fn config(&self) -> &AdmissionConfig {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Current list for `key`, or a virtual draft when none has been stored yet.
    pub fn view_list(&self, key: &GuestListKey) -> Result<GuestListView, AdmissionError> {
        let today = self.today();
        let list = self.load_or_new(key)?;
        let titular = self.titular(&key.titular_id)?;
        let quota = self.quota_for(&titular, &list);

        Ok(GuestListView {
            editable: list.is_editable(today),
            sendable: list.is_sendable(today, self.config.pre_registration_days),
            quota,
            list,
        })
    }

    pub fn quota(&self, key: &GuestListKey) -> Result<QuotaSummary, AdmissionError> {
        let list = self.load_or_new(key)?;
        let titular = self.titular(&key.titular_id)?;
        Ok(self.quota_for(&titular, &list))
    }

    pub fn add_guest(
        &self,
        key: &GuestListKey,
        registration: GuestRegistration,
    ) -> Result<DailyGuestList, AdmissionError> {
        self.register_guest(key, registration)
            .inspect_err(|err| rejected("add_guest", key, err))
    }

    pub fn remove_guest(
        &self,
        key: &GuestListKey,
        dni: &str,
    ) -> Result<DailyGuestList, AdmissionError> {
        let dni = dni.trim();
        self.unregister_guest(key, dni)
            .inspect_err(|err| rejected("remove_guest", key, err))
    }

    pub fn send_list(&self, key: &GuestListKey) -> Result<DailyGuestList, AdmissionError> {
        self.send_loaded(key)
            .inspect_err(|err| rejected("send_list", key, err))
    }

    pub fn cancel_list(
        &self,
        key: &GuestListKey,
        by: CancelledBy,
    ) -> Result<DailyGuestList, AdmissionError> {
        self.cancel_loaded(key, by)
            .inspect_err(|err| rejected("cancel_list", key, err))
    }

    pub fn process_list(&self, key: &GuestListKey) -> Result<DailyGuestList, AdmissionError> {
        self.process_loaded(key)
            .inspect_err(|err| rejected("process_list", key, err))
    }

    /// Evaluate entry for whoever holds `dni` in the titular's group without recording it.
    pub fn check_entry(
        &self,
        titular_id: &TitularId,
        dni: &str,
    ) -> Result<EntryDecision, AdmissionError> {
        let titular = self.titular(titular_id)?;
        self.decide_entry(&titular, dni.trim())
    }

    /// Record a titular, family member or adherent at the gate for today. Opens the guest gate
    /// and creates the day's list when none exists yet.
    pub fn record_member_entry(
        &self,
        titular_id: &TitularId,
        dni: &str,
    ) -> Result<MemberEntry, AdmissionError> {
        let key = GuestListKey::new(titular_id.clone(), self.today());
        self.enter_member(&key, dni.trim())
            .inspect_err(|err| rejected("record_member_entry", &key, err))
    }

    /// Admit a guest. Fails on an already-entered guest; see `revoke_guest`.
    pub fn admit_guest(
        &self,
        key: &GuestListKey,
        dni: &str,
        request: AdmissionRequest,
    ) -> Result<DailyGuestList, AdmissionError> {
        let dni = dni.trim();
        self.load_existing(key)
            .and_then(|list| self.admit_loaded(list, dni, request))
            .inspect_err(|err| rejected("admit_guest", key, err))
    }

    /// Reverse a guest's entry, releasing any birthday slot and payment classification.
    pub fn revoke_guest(
        &self,
        key: &GuestListKey,
        dni: &str,
    ) -> Result<DailyGuestList, AdmissionError> {
        let dni = dni.trim();
        self.load_existing(key)
            .and_then(|list| self.revoke_loaded(list, dni))
            .inspect_err(|err| rejected("revoke_guest", key, err))
    }

    /// Legacy single-button behavior: admits a waiting guest, revokes an entered one.
    pub fn toggle_guest_entry(
        &self,
        key: &GuestListKey,
        dni: &str,
        request: AdmissionRequest,
    ) -> Result<DailyGuestList, AdmissionError> {
        let dni = dni.trim();
        self.toggle_loaded(key, dni, request)
            .inspect_err(|err| rejected("toggle_guest_entry", key, err))
    }

    /// Mark or unmark a waiting guest as a birthday guest ahead of entry.
    pub fn set_birthday_flag(
        &self,
        key: &GuestListKey,
        dni: &str,
        flag: bool,
    ) -> Result<DailyGuestList, AdmissionError> {
        let dni = dni.trim();
        self.flag_loaded(key, dni, flag)
            .inspect_err(|err| rejected("set_birthday_flag", key, err))
    }

    fn register_guest(
        &self,
        key: &GuestListKey,
        registration: GuestRegistration,
    ) -> Result<DailyGuestList, AdmissionError> {
        let mut list = self.load_writable(key)?;
        let dni = registration.dni.trim().to_string();
        list.add_guest(registration, self.today())?;
        let list = self.persist(list)?;
        info!(list = %key, guest = %dni, "guest registered");
        Ok(list)
    }

    fn unregister_guest(
        &self,
        key: &GuestListKey,
        dni: &str,
    ) -> Result<DailyGuestList, AdmissionError> {
        let mut list = self.load_existing(key)?;
        list.remove_guest(dni, self.today())?;
        let list = self.persist(list)?;
        info!(list = %key, guest = dni, "guest removed");
        Ok(list)
    }

    fn send_loaded(&self, key: &GuestListKey) -> Result<DailyGuestList, AdmissionError> {
        let mut list = self.load_writable(key)?;
        let previous = list.state;
        list.send(self.today(), self.config.pre_registration_days)?;
        let list = self.persist(list)?;
        info!(list = %key, from = %previous, guests = list.guests.len(), "guest list sent");
        Ok(list)
    }

    fn cancel_loaded(
        &self,
        key: &GuestListKey,
        by: CancelledBy,
    ) -> Result<DailyGuestList, AdmissionError> {
        let mut list = self.load_existing(key)?;
        list.cancel(by)?;
        let list = self.persist(list)?;
        info!(list = %key, state = %list.state, "guest list cancelled");
        Ok(list)
    }

    fn process_loaded(&self, key: &GuestListKey) -> Result<DailyGuestList, AdmissionError> {
        let mut list = self.load_existing(key)?;
        list.process()?;
        let list = self.persist(list)?;
        info!(list = %key, "guest list processed");
        Ok(list)
    }

    fn enter_member(&self, key: &GuestListKey, dni: &str) -> Result<MemberEntry, AdmissionError> {
        let titular = self.titular(&key.titular_id)?;
        let decision = self.decide_entry(&titular, dni)?;
        if let Some(denial) = decision.denial {
            return Err(AdmissionError::EntryDenied(denial));
        }

        let mut list = self.load_writable(key)?;
        list.record_member_entry(&decision.dni);
        let list = self.persist(list)?;

        info!(
            list = %key,
            member = %decision.dni,
            role = decision.role.label(),
            fitness = decision.fitness.status.label(),
            "member entry recorded"
        );
        Ok(MemberEntry { decision, list })
    }

    fn toggle_loaded(
        &self,
        key: &GuestListKey,
        dni: &str,
        request: AdmissionRequest,
    ) -> Result<DailyGuestList, AdmissionError> {
        let list = self.load_existing(key)?;
        let entered = list
            .guest(dni)
            .map(|guest| guest.entered)
            .ok_or_else(|| AdmissionError::GuestNotFound(dni.to_string()))?;

        if entered {
            self.revoke_loaded(list, dni)
        } else {
            self.admit_loaded(list, dni, request)
        }
    }

    fn flag_loaded(
        &self,
        key: &GuestListKey,
        dni: &str,
        flag: bool,
    ) -> Result<DailyGuestList, AdmissionError> {
        let mut list = self.load_existing(key)?;
        list.ensure_editable(self.today())?;

        let (entered, birth_date) = list
            .guest(dni)
            .map(|guest| (guest.entered, guest.birth_date))
            .ok_or_else(|| AdmissionError::GuestNotFound(dni.to_string()))?;
        if entered {
            return Err(AdmissionError::AlreadyEntered(dni.to_string()));
        }

        if flag {
            if age_on(birth_date, list.date) < self.config.free_entry_age {
                return Err(AdmissionError::validation(format!(
                    "guests under {} enter free and do not use birthday quota",
                    self.config.free_entry_age
                )));
            }
            self.ensure_birthday_slot(&list, dni)?;
        }

        list.guest_mut(dni)?.is_birthday_guest = flag;
        let list = self.persist(list)?;
        info!(list = %key, guest = dni, flag, "birthday flag updated");
        Ok(list)
    }

    fn admit_loaded(
        &self,
        mut list: DailyGuestList,
        dni: &str,
        request: AdmissionRequest,
    ) -> Result<DailyGuestList, AdmissionError> {
        list.ensure_gate_open()?;

        if !matches!(
            list.state,
            GuestListState::Sent | GuestListState::Processed
        ) {
            return Err(AdmissionError::InvalidTransition {
                from: list.state,
                action: "admit guests from",
            });
        }

        let (entered, birth_date) = list
            .guest(dni)
            .map(|guest| (guest.entered, guest.birth_date))
            .ok_or_else(|| AdmissionError::GuestNotFound(dni.to_string()))?;
        if entered {
            return Err(AdmissionError::AlreadyEntered(dni.to_string()));
        }

        let admission = if age_on(birth_date, list.date) < self.config.free_entry_age {
            GuestAdmission::FreeUnderAge
        } else if request.birthday_guest {
            self.ensure_birthday_slot(&list, dni)?;
            GuestAdmission::Birthday
        } else {
            let method = request
                .payment_method
                .ok_or(AdmissionError::PaymentMethodRequired)?;
            GuestAdmission::Paid { method }
        };

        let guest = list.guest_mut(dni)?;
        guest.entered = true;
        match admission {
            GuestAdmission::FreeUnderAge => {
                guest.is_birthday_guest = false;
                guest.payment_method = None;
            }
            GuestAdmission::Birthday => {
                guest.is_birthday_guest = true;
                guest.payment_method = None;
            }
            GuestAdmission::Paid { method } => {
                guest.is_birthday_guest = false;
                guest.payment_method = Some(method);
            }
        }

        let list = self.persist(list)?;
        info!(list = %list.key(), guest = dni, ?admission, "guest admitted");
        Ok(list)
    }

    fn revoke_loaded(
        &self,
        mut list: DailyGuestList,
        dni: &str,
    ) -> Result<DailyGuestList, AdmissionError> {
        if list.state.is_terminal() {
            return Err(AdmissionError::InvalidTransition {
                from: list.state,
                action: "revoke guests from",
            });
        }

        let guest = list.guest_mut(dni)?;
        if !guest.entered {
            return Err(AdmissionError::NotEntered(dni.to_string()));
        }
        guest.clear_entry();

        let list = self.persist(list)?;
        info!(list = %list.key(), guest = dni, "guest entry revoked");
        Ok(list)
    }

    fn ensure_birthday_slot(&self, list: &DailyGuestList, dni: &str) -> Result<(), AdmissionError> {
        let restricted = self.restricted.is_restricted(list.date);
        if restricted {
            return Err(AdmissionError::RestrictedDate(list.date));
        }

        let titular = self.titular(&list.titular_id)?;
        let summary = self.quota.allocate(
            list.date,
            QuotaAllocator::birthday_members(&titular, list.date),
            QuotaAllocator::used(&list.guests, Some(dni)),
            restricted,
        );
        self.quota.ensure_slot(&summary)
    }

    fn quota_for(&self, titular: &Titular, list: &DailyGuestList) -> QuotaSummary {
        self.quota.summarize(
            titular,
            list.date,
            &list.guests,
            self.restricted.is_restricted(list.date),
        )
    }

    fn decide_entry(&self, titular: &Titular, dni: &str) -> Result<EntryDecision, AdmissionError> {
        let entrant = titular
            .entrant(dni)
            .ok_or_else(|| AdmissionError::PersonNotFound {
                titular_id: titular.id.clone(),
                dni: dni.trim().to_string(),
            })?;
        let fitness = self.fitness.evaluate(entrant.fitness(), self.today());
        Ok(resolve_entry(&entrant, fitness))
    }

    fn titular(&self, id: &TitularId) -> Result<Titular, AdmissionError> {
        self.directory
            .get_titular(id)?
            .ok_or_else(|| AdmissionError::TitularNotFound(id.clone()))
    }

    fn load(&self, key: &GuestListKey) -> Result<Option<DailyGuestList>, AdmissionError> {
        let today = self.today();
        let list = self.store.get(&key.titular_id, key.date)?;
        Ok(list.map(|mut list| {
            list.refresh(today);
            list
        }))
    }

    fn load_existing(&self, key: &GuestListKey) -> Result<DailyGuestList, AdmissionError> {
        self.load(key)?
            .ok_or_else(|| AdmissionError::ListNotFound(key.clone()))
    }

    fn load_or_new(&self, key: &GuestListKey) -> Result<DailyGuestList, AdmissionError> {
        Ok(self.load(key)?.unwrap_or_else(|| DailyGuestList::new(key)))
    }

    /// Like `load_or_new`, but a cancelled list for today or later is replaced by a fresh draft.
    fn load_writable(&self, key: &GuestListKey) -> Result<DailyGuestList, AdmissionError> {
        let list = self.load_or_new(key)?;
        if list.is_cancelled() && list.date >= self.today() {
            info!(list = %key, state = %list.state, "reopening cancelled guest list");
            return Ok(list.reopened());
        }
        Ok(list)
    }

    fn persist(&self, list: DailyGuestList) -> Result<DailyGuestList, AdmissionError> {
        Ok(self.store.put(list)?)
    }
}

fn rejected(operation: &'static str, key: &GuestListKey, err: &AdmissionError) {
    warn!(operation, list = %key, kind = err.kind(), error = %err, "admission operation rejected");
}
