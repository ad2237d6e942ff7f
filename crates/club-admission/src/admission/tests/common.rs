use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{Duration, NaiveDate};
use serde_json::Value;

use crate::admission::domain::{
    Adherent, AdherentStatus, DailyGuestList, FamilyMember, FitnessRecord, GuestListKey,
    GuestRegistration, MemberStatus, Titular, TitularId,
};
use crate::admission::ports::{FixedClock, GuestListStore, MemberDirectory, StoreError};
use crate::admission::{admission_router, AdmissionConfig, AdmissionService};

pub(super) const TITULAR_ID: &str = "t-100";
pub(super) const TITULAR_DNI: &str = "20300400";
pub(super) const FAMILY_DNI: &str = "40300400";
pub(super) const ADHERENT_DNI: &str = "30300400";

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn today() -> NaiveDate {
    date(2026, 3, 14)
}

pub(super) fn days_from_today(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}

pub(super) fn adult_birth_date() -> NaiveDate {
    date(1995, 5, 5)
}

pub(super) fn toddler_birth_date() -> NaiveDate {
    date(2024, 6, 1)
}

pub(super) fn fitness_until(expires_at: NaiveDate) -> FitnessRecord {
    FitnessRecord {
        valid: true,
        issued_at: Some(expires_at - Duration::days(365)),
        expires_at: Some(expires_at),
        invalidity_reason: None,
    }
}

pub(super) fn titular_id() -> TitularId {
    TitularId(TITULAR_ID.to_string())
}

pub(super) fn key_for(date: NaiveDate) -> GuestListKey {
    GuestListKey::new(titular_id(), date)
}

pub(super) fn today_key() -> GuestListKey {
    key_for(today())
}

/// Titular with one family member and one adherent; nobody has a birthday on `today()`.
pub(super) fn titular(status: MemberStatus) -> Titular {
    Titular {
        id: titular_id(),
        dni: TITULAR_DNI.to_string(),
        first_name: "Marta".to_string(),
        last_name: "Paz".to_string(),
        status,
        fitness: Some(fitness_until(days_from_today(90))),
        birth_date: date(1985, 7, 2),
        family_members: vec![FamilyMember {
            id: "f-1".to_string(),
            dni: FAMILY_DNI.to_string(),
            first_name: "Leo".to_string(),
            last_name: "Paz".to_string(),
            birth_date: date(2012, 9, 9),
            fitness: None,
        }],
        adherents: vec![Adherent {
            id: "a-1".to_string(),
            dni: ADHERENT_DNI.to_string(),
            first_name: "Rita".to_string(),
            last_name: "Sol".to_string(),
            birth_date: date(1990, 1, 20),
            fitness: Some(fitness_until(days_from_today(-10))),
            adherent_status: AdherentStatus::Active,
        }],
    }
}

/// Active titular whose own and family member's birthdays fall on `today()`.
pub(super) fn birthday_titular() -> Titular {
    let mut titular = titular(MemberStatus::Active);
    titular.birth_date = date(1985, 3, 14);
    titular.family_members[0].birth_date = date(2012, 3, 14);
    titular
}

pub(super) fn registration(first_name: &str, last_name: &str, dni: &str) -> GuestRegistration {
    GuestRegistration {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        dni: dni.to_string(),
        birth_date: adult_birth_date(),
    }
}

pub(super) fn adult_guest(dni: &str) -> GuestRegistration {
    registration("Ana", "Ruiz", dni)
}

pub(super) fn toddler_guest(dni: &str) -> GuestRegistration {
    GuestRegistration {
        birth_date: toddler_birth_date(),
        ..registration("Tomi", "Ruiz", dni)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    lists: Arc<Mutex<HashMap<GuestListKey, DailyGuestList>>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub(super) fn stored(&self, key: &GuestListKey) -> Option<DailyGuestList> {
        self.lists.lock().expect("store mutex poisoned").get(key).cloned()
    }

    pub(super) fn seed(&self, list: DailyGuestList) {
        self.lists
            .lock()
            .expect("store mutex poisoned")
            .insert(list.key(), list);
    }

    pub(super) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl GuestListStore for MemoryStore {
    fn get(
        &self,
        titular_id: &TitularId,
        date: NaiveDate,
    ) -> Result<Option<DailyGuestList>, StoreError> {
        let key = GuestListKey::new(titular_id.clone(), date);
        Ok(self.stored(&key))
    }

    fn put(&self, list: DailyGuestList) -> Result<DailyGuestList, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.seed(list.clone());
        Ok(list)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryDirectory {
    titulars: Arc<Mutex<HashMap<TitularId, Titular>>>,
}

impl MemoryDirectory {
    pub(super) fn with(titular: Titular) -> Self {
        let directory = Self::default();
        directory.upsert(titular);
        directory
    }

    pub(super) fn upsert(&self, titular: Titular) {
        self.titulars
            .lock()
            .expect("directory mutex poisoned")
            .insert(titular.id.clone(), titular);
    }
}

impl MemberDirectory for MemoryDirectory {
    fn get_titular(&self, id: &TitularId) -> Result<Option<Titular>, StoreError> {
        Ok(self
            .titulars
            .lock()
            .expect("directory mutex poisoned")
            .get(id)
            .cloned())
    }
}

pub(super) struct UnavailableStore;

impl GuestListStore for UnavailableStore {
    fn get(
        &self,
        _titular_id: &TitularId,
        _date: NaiveDate,
    ) -> Result<Option<DailyGuestList>, StoreError> {
        Err(StoreError::Unavailable("document store offline".to_string()))
    }

    fn put(&self, _list: DailyGuestList) -> Result<DailyGuestList, StoreError> {
        Err(StoreError::Unavailable("document store offline".to_string()))
    }
}

pub(super) struct Harness {
    pub(super) service: AdmissionService<MemoryStore, MemoryDirectory>,
    pub(super) store: Arc<MemoryStore>,
    pub(super) directory: Arc<MemoryDirectory>,
    pub(super) clock: Arc<FixedClock>,
}

pub(super) fn harness(titular: Titular) -> Harness {
    harness_with(titular, AdmissionConfig::default())
}

pub(super) fn harness_with(titular: Titular, config: AdmissionConfig) -> Harness {
    let store = Arc::new(MemoryStore::default());
    let directory = Arc::new(MemoryDirectory::with(titular));
    let clock = Arc::new(FixedClock::new(today()));
    let service =
        AdmissionService::new(store.clone(), directory.clone(), clock.clone(), config);

    Harness {
        service,
        store,
        directory,
        clock,
    }
}

/// Today's list with the given guests, sent, and optionally with the gate opened.
pub(super) fn sent_list_with(
    harness: &Harness,
    guests: Vec<GuestRegistration>,
    gate_open: bool,
) -> GuestListKey {
    let key = today_key();
    for guest in guests {
        harness
            .service
            .add_guest(&key, guest)
            .expect("guest registers");
    }
    harness.service.send_list(&key).expect("list sends");

    if gate_open {
        harness
            .service
            .record_member_entry(&key.titular_id, TITULAR_DNI)
            .expect("titular enters");
    }
    key
}

pub(super) fn router_for(harness: Harness) -> axum::Router {
    admission_router(Arc::new(harness.service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
