use super::common::*;
use crate::admission::domain::{AdherentStatus, EntrantRole, MemberStatus, Titular};
use crate::admission::eligibility::{resolve_entry, EntryDecision, EntryDenial};
use crate::admission::fitness::{FitnessEvaluator, FitnessState};

fn decide(titular: &Titular, dni: &str) -> EntryDecision {
    let entrant = titular.entrant(dni).expect("entrant exists");
    let fitness = FitnessEvaluator::default().evaluate(entrant.fitness(), today());
    resolve_entry(&entrant, fitness)
}

#[test]
fn inactive_titular_blocks_titular_and_family() {
    for status in [MemberStatus::Inactive, MemberStatus::PendingValidation] {
        let group = titular(status);
        for dni in [TITULAR_DNI, FAMILY_DNI] {
            let decision = decide(&group, dni);
            assert!(!decision.permitted, "{dni} should be blocked for {status:?}");
            assert_eq!(
                decision.denial,
                Some(EntryDenial::TitularInactive { status })
            );
            assert!(decision.reason.starts_with("titular inactive"));
        }
    }
}

#[test]
fn adherent_requires_both_titular_and_adherent_active() {
    let cases = [
        (MemberStatus::Active, AdherentStatus::Active, true),
        (MemberStatus::Active, AdherentStatus::Inactive, false),
        (MemberStatus::Inactive, AdherentStatus::Active, false),
        (MemberStatus::Inactive, AdherentStatus::Inactive, false),
    ];

    for (titular_status, adherent_status, expected) in cases {
        let mut group = titular(titular_status);
        group.adherents[0].adherent_status = adherent_status;
        let decision = decide(&group, ADHERENT_DNI);
        assert_eq!(
            decision.permitted, expected,
            "titular {titular_status:?}, adherent {adherent_status:?}"
        );
        assert_eq!(decision.role, EntrantRole::Adherent);
    }
}

#[test]
fn titular_status_dominates_the_denial_message() {
    let mut group = titular(MemberStatus::Inactive);
    group.adherents[0].adherent_status = AdherentStatus::Inactive;

    let decision = decide(&group, ADHERENT_DNI);
    assert_eq!(
        decision.denial,
        Some(EntryDenial::TitularInactive {
            status: MemberStatus::Inactive
        })
    );
    assert_eq!(decision.reason, "titular inactive");

    let mut group = titular(MemberStatus::Active);
    group.adherents[0].adherent_status = AdherentStatus::Inactive;
    let decision = decide(&group, ADHERENT_DNI);
    assert_eq!(decision.denial, Some(EntryDenial::AdherentInactive));
    assert_eq!(decision.reason, "adherent inactive");
}

#[test]
fn expired_fitness_is_advisory_only() {
    let group = titular(MemberStatus::Active);
    let decision = decide(&group, ADHERENT_DNI);

    assert!(decision.permitted);
    assert_eq!(decision.fitness.status, FitnessState::Expired);
    assert!(decision.reason.contains("expired"));
}

#[test]
fn missing_fitness_still_permits_family_entry() {
    let group = titular(MemberStatus::Active);
    let decision = decide(&group, FAMILY_DNI);

    assert!(decision.permitted);
    assert_eq!(decision.fitness.status, FitnessState::Pending);
    assert!(decision.reason.starts_with("entry permitted"));
}
