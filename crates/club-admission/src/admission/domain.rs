use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for titular (account-holding) members.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TitularId(pub String);

impl fmt::Display for TitularId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage key for a daily guest list: one list per titular per calendar day.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GuestListKey {
    pub titular_id: TitularId,
    pub date: NaiveDate,
}

impl GuestListKey {
    pub fn new(titular_id: TitularId, date: NaiveDate) -> Self {
        Self { titular_id, date }
    }

    pub fn list_id(&self) -> String {
        format!("{}-{}", self.titular_id, self.date.format("%Y-%m-%d"))
    }
}

impl fmt::Display for GuestListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.titular_id, self.date)
    }
}

/// Outcome of a medical review. A new review appends a new record rather than editing this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitnessRecord {
    pub valid: bool,
    #[serde(default)]
    pub issued_at: Option<NaiveDate>,
    #[serde(default)]
    pub expires_at: Option<NaiveDate>,
    #[serde(default)]
    pub invalidity_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Inactive,
    PendingValidation,
}

impl MemberStatus {
    pub const fn label(self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
            MemberStatus::PendingValidation => "pending_validation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdherentStatus {
    Active,
    Inactive,
}

/// Account-holding member. Family members and adherents live and die with the titular.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Titular {
    pub id: TitularId,
    pub dni: String,
    pub first_name: String,
    pub last_name: String,
    pub status: MemberStatus,
    #[serde(default)]
    pub fitness: Option<FitnessRecord>,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub family_members: Vec<FamilyMember>,
    #[serde(default)]
    pub adherents: Vec<Adherent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: String,
    pub dni: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub fitness: Option<FitnessRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adherent {
    pub id: String,
    pub dni: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub fitness: Option<FitnessRecord>,
    pub adherent_status: AdherentStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrantRole {
    Titular,
    FamilyMember,
    Adherent,
}

impl EntrantRole {
    pub const fn label(self) -> &'static str {
        match self {
            EntrantRole::Titular => "titular",
            EntrantRole::FamilyMember => "family_member",
            EntrantRole::Adherent => "adherent",
        }
    }
}

/// A member of a titular's group presenting at the gate, resolved by DNI.
#[derive(Debug, Clone, Copy)]
pub enum Entrant<'a> {
    Titular(&'a Titular),
    FamilyMember {
        titular: &'a Titular,
        member: &'a FamilyMember,
    },
    Adherent {
        titular: &'a Titular,
        adherent: &'a Adherent,
    },
}

impl<'a> Entrant<'a> {
    pub fn titular(&self) -> &'a Titular {
        match self {
            Entrant::Titular(titular) => titular,
            Entrant::FamilyMember { titular, .. } | Entrant::Adherent { titular, .. } => titular,
        }
    }

    pub fn role(&self) -> EntrantRole {
        match self {
            Entrant::Titular(_) => EntrantRole::Titular,
            Entrant::FamilyMember { .. } => EntrantRole::FamilyMember,
            Entrant::Adherent { .. } => EntrantRole::Adherent,
        }
    }

    pub fn dni(&self) -> &'a str {
        match self {
            Entrant::Titular(titular) => &titular.dni,
            Entrant::FamilyMember { member, .. } => &member.dni,
            Entrant::Adherent { adherent, .. } => &adherent.dni,
        }
    }

    pub fn fitness(&self) -> Option<&'a FitnessRecord> {
        match self {
            Entrant::Titular(titular) => titular.fitness.as_ref(),
            Entrant::FamilyMember { member, .. } => member.fitness.as_ref(),
            Entrant::Adherent { adherent, .. } => adherent.fitness.as_ref(),
        }
    }
}

impl Titular {
    /// Find whoever holds `dni` within this titular's group.
    pub fn entrant(&self, dni: &str) -> Option<Entrant<'_>> {
        let dni = dni.trim();
        if self.dni == dni {
            return Some(Entrant::Titular(self));
        }

        if let Some(member) = self.family_members.iter().find(|member| member.dni == dni) {
            return Some(Entrant::FamilyMember {
                titular: self,
                member,
            });
        }

        self.adherents
            .iter()
            .find(|adherent| adherent.dni == dni)
            .map(|adherent| Entrant::Adherent {
                titular: self,
                adherent,
            })
    }

    /// Birth dates of the family group that can grant birthday-guest admissions.
    pub fn family_birth_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        std::iter::once(self.birth_date).chain(
            self.family_members
                .iter()
                .map(|member| member.birth_date),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Till,
}

impl PaymentMethod {
    pub const fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Till => "till",
        }
    }
}

/// Data a titular submits when putting someone on a guest list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestRegistration {
    pub first_name: String,
    pub last_name: String,
    pub dni: String,
    pub birth_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub first_name: String,
    pub last_name: String,
    pub dni: String,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub entered: bool,
    #[serde(default)]
    pub is_birthday_guest: bool,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub fitness: Option<FitnessRecord>,
}

impl Guest {
    /// Name, surname and DNI all present; the minimum for a list to be sent.
    pub fn is_complete(&self) -> bool {
        !self.first_name.trim().is_empty()
            && !self.last_name.trim().is_empty()
            && !self.dni.trim().is_empty()
    }

    pub(crate) fn clear_entry(&mut self) {
        self.entered = false;
        self.is_birthday_guest = false;
        self.payment_method = None;
    }
}

impl From<GuestRegistration> for Guest {
    fn from(registration: GuestRegistration) -> Self {
        Self {
            first_name: registration.first_name.trim().to_string(),
            last_name: registration.last_name.trim().to_string(),
            dni: registration.dni.trim().to_string(),
            birth_date: registration.birth_date,
            entered: false,
            is_birthday_guest: false,
            payment_method: None,
            fitness: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestListState {
    Draft,
    Sent,
    Processed,
    CancelledByMember,
    CancelledByAdmin,
    Expired,
}

impl GuestListState {
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            GuestListState::CancelledByMember
                | GuestListState::CancelledByAdmin
                | GuestListState::Expired
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            GuestListState::Draft => "draft",
            GuestListState::Sent => "sent",
            GuestListState::Processed => "processed",
            GuestListState::CancelledByMember => "cancelled_by_member",
            GuestListState::CancelledByAdmin => "cancelled_by_admin",
            GuestListState::Expired => "expired",
        }
    }
}

impl fmt::Display for GuestListState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-titular, per-day guest list. Lists are never deleted, only moved to a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyGuestList {
    pub id: String,
    pub titular_id: TitularId,
    pub date: NaiveDate,
    pub guests: Vec<Guest>,
    pub state: GuestListState,
    pub responding_member_has_entered: bool,
    pub member_entries: BTreeSet<String>,
}

/// Completed years between `birth_date` and `on`; zero for dates before birth.
pub fn age_on(birth_date: NaiveDate, on: NaiveDate) -> u32 {
    if on < birth_date {
        return 0;
    }

    let mut years = on.year() - birth_date.year();
    if (on.month(), on.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Whether `date` is the birthday of someone born on `birth_date`.
/// Feb 29 birthdays are celebrated on Feb 28 in non-leap years.
pub fn birthday_falls_on(birth_date: NaiveDate, date: NaiveDate) -> bool {
    if date < birth_date {
        return false;
    }

    if birth_date.month() == 2 && birth_date.day() == 29 && !is_leap_year(date.year()) {
        return date.month() == 2 && date.day() == 28;
    }

    birth_date.month() == date.month() && birth_date.day() == date.day()
}

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn age_counts_completed_years() {
        assert_eq!(age_on(date(2020, 6, 15), date(2023, 6, 14)), 2);
        assert_eq!(age_on(date(2020, 6, 15), date(2023, 6, 15)), 3);
        assert_eq!(age_on(date(2020, 6, 15), date(2019, 1, 1)), 0);
    }

    #[test]
    fn leap_day_birthdays_fall_back_to_feb_28() {
        let born = date(2000, 2, 29);
        assert!(birthday_falls_on(born, date(2023, 2, 28)));
        assert!(!birthday_falls_on(born, date(2024, 2, 28)));
        assert!(birthday_falls_on(born, date(2024, 2, 29)));
    }

    #[test]
    fn entrant_lookup_resolves_roles_by_dni() {
        let titular = Titular {
            id: TitularId("t-1".to_string()),
            dni: "20111222".to_string(),
            first_name: "Marta".to_string(),
            last_name: "Paz".to_string(),
            status: MemberStatus::Active,
            fitness: None,
            birth_date: date(1980, 3, 1),
            family_members: vec![FamilyMember {
                id: "f-1".to_string(),
                dni: "40111222".to_string(),
                first_name: "Leo".to_string(),
                last_name: "Paz".to_string(),
                birth_date: date(2012, 7, 9),
                fitness: None,
            }],
            adherents: vec![Adherent {
                id: "a-1".to_string(),
                dni: "30111222".to_string(),
                first_name: "Rita".to_string(),
                last_name: "Sol".to_string(),
                birth_date: date(1990, 1, 1),
                fitness: None,
                adherent_status: AdherentStatus::Active,
            }],
        };

        assert_eq!(
            titular.entrant("20111222").map(|e| e.role()),
            Some(EntrantRole::Titular)
        );
        assert_eq!(
            titular.entrant(" 40111222 ").map(|e| e.role()),
            Some(EntrantRole::FamilyMember)
        );
        assert_eq!(
            titular.entrant("30111222").map(|e| e.role()),
            Some(EntrantRole::Adherent)
        );
        assert!(titular.entrant("99999999").is_none());
    }
}
