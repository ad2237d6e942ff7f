use chrono::{Duration, NaiveDate};
use club_admission::admission::{
    Adherent, AdherentStatus, DailyGuestList, FamilyMember, FitnessRecord, GuestListKey,
    GuestListStore, MemberDirectory, MemberStatus, StoreError, Titular, TitularId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

pub(crate) const SAMPLE_TITULAR_ID: &str = "T-1001";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryGuestListStore {
    lists: Arc<Mutex<HashMap<GuestListKey, DailyGuestList>>>,
}

impl GuestListStore for InMemoryGuestListStore {
    fn get(
        &self,
        titular_id: &TitularId,
        date: NaiveDate,
    ) -> Result<Option<DailyGuestList>, StoreError> {
        let guard = self.lists.lock().map_err(poisoned)?;
        Ok(guard
            .get(&GuestListKey::new(titular_id.clone(), date))
            .cloned())
    }

    fn put(&self, list: DailyGuestList) -> Result<DailyGuestList, StoreError> {
        let mut guard = self.lists.lock().map_err(poisoned)?;
        guard.insert(list.key(), list.clone());
        Ok(list)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryMemberDirectory {
    titulars: Arc<Mutex<HashMap<TitularId, Titular>>>,
}

impl InMemoryMemberDirectory {
    pub(crate) fn seeded(titulars: impl IntoIterator<Item = Titular>) -> Self {
        let directory = Self::default();
        if let Ok(mut guard) = directory.titulars.lock() {
            guard.extend(
                titulars
                    .into_iter()
                    .map(|titular| (titular.id.clone(), titular)),
            );
        }
        directory
    }
}

impl MemberDirectory for InMemoryMemberDirectory {
    fn get_titular(&self, id: &TitularId) -> Result<Option<Titular>, StoreError> {
        let guard = self.titulars.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Unavailable("in-memory store lock poisoned".to_string())
}

/// Sample household whose titular and eldest child both celebrate their birthday on `today`.
pub(crate) fn sample_family(today: NaiveDate) -> Titular {
    let born = |years_ago: i32| birthday_years_before(today, years_ago);

    Titular {
        id: TitularId(SAMPLE_TITULAR_ID.to_string()),
        dni: "23456789".to_string(),
        first_name: "Laura".to_string(),
        last_name: "Gómez".to_string(),
        status: MemberStatus::Active,
        fitness: Some(FitnessRecord {
            valid: true,
            issued_at: Some(today - Duration::days(360)),
            expires_at: Some(today + Duration::days(5)),
            invalidity_reason: None,
        }),
        birth_date: born(41),
        family_members: vec![
            FamilyMember {
                id: "FM-1".to_string(),
                dni: "45678901".to_string(),
                first_name: "Mateo".to_string(),
                last_name: "Gómez".to_string(),
                birth_date: born(12),
                fitness: Some(FitnessRecord {
                    valid: true,
                    issued_at: None,
                    expires_at: Some(today + Duration::days(200)),
                    invalidity_reason: None,
                }),
            },
            FamilyMember {
                id: "FM-2".to_string(),
                dni: "47890123".to_string(),
                first_name: "Lucía".to_string(),
                last_name: "Gómez".to_string(),
                birth_date: today - Duration::days(2_000),
                fitness: None,
            },
        ],
        adherents: vec![Adherent {
            id: "AD-1".to_string(),
            dni: "34567890".to_string(),
            first_name: "Pablo".to_string(),
            last_name: "Ríos".to_string(),
            birth_date: today - Duration::days(15_000),
            fitness: Some(FitnessRecord {
                valid: false,
                issued_at: None,
                expires_at: None,
                invalidity_reason: Some("cardiology review pending".to_string()),
            }),
            adherent_status: AdherentStatus::Inactive,
        }],
    }
}

fn birthday_years_before(today: NaiveDate, years: i32) -> NaiveDate {
    use chrono::Datelike;

    today
        .with_year(today.year() - years)
        .or_else(|| NaiveDate::from_ymd_opt(today.year() - years, 2, 28))
        .unwrap_or(today)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use club_admission::admission::birthday_falls_on;

    #[test]
    fn sample_family_celebrates_on_the_seed_date() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid");
        let family = sample_family(today);

        assert!(birthday_falls_on(family.birth_date, today));
        assert!(birthday_falls_on(family.family_members[0].birth_date, today));
        assert!(!birthday_falls_on(family.family_members[1].birth_date, today));
    }

    #[test]
    fn parse_date_reports_the_raw_value() {
        assert_eq!(
            parse_date(" 2026-03-14 ").expect("parses"),
            NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid")
        );
        let err = parse_date("14/03/2026").expect_err("rejects");
        assert!(err.contains("14/03/2026"));
    }

    #[test]
    fn store_round_trips_lists_by_key() {
        let store = InMemoryGuestListStore::default();
        let key = GuestListKey::new(
            TitularId(SAMPLE_TITULAR_ID.to_string()),
            NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid"),
        );

        assert!(store
            .get(&key.titular_id, key.date)
            .expect("get")
            .is_none());
        store.put(DailyGuestList::new(&key)).expect("put");
        let stored = store
            .get(&key.titular_id, key.date)
            .expect("get")
            .expect("stored");
        assert_eq!(stored.key(), key);
    }
}
