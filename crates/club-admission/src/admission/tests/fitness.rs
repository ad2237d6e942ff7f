use super::common::*;
use crate::admission::domain::FitnessRecord;
use crate::admission::fitness::{FitnessEvaluator, FitnessState};

#[test]
fn missing_record_is_pending() {
    let status = FitnessEvaluator::default().evaluate(None, today());
    assert_eq!(status.status, FitnessState::Pending);
    assert_eq!(status.days_remaining, None);
}

#[test]
fn invalid_record_reports_reason_or_generic_message() {
    let evaluator = FitnessEvaluator::default();
    let mut record = FitnessRecord {
        valid: false,
        issued_at: Some(days_from_today(-3)),
        expires_at: Some(days_from_today(300)),
        invalidity_reason: Some("pending cardiology review".to_string()),
    };

    let status = evaluator.evaluate(Some(&record), today());
    assert_eq!(status.status, FitnessState::Invalid);
    assert!(status.message.contains("pending cardiology review"));

    record.invalidity_reason = None;
    let status = evaluator.evaluate(Some(&record), today());
    assert_eq!(status.status, FitnessState::Invalid);
    assert!(status.message.contains("not specified"));
}

#[test]
fn expiry_day_itself_is_still_valid() {
    let status = FitnessEvaluator::default().evaluate(Some(&fitness_until(today())), today());
    assert_eq!(status.status, FitnessState::Valid);
    assert_eq!(status.days_remaining, Some(0));
    assert!(status.near_expiry);
}

#[test]
fn day_after_expiry_is_expired() {
    let record = fitness_until(days_from_today(-1));
    let status = FitnessEvaluator::default().evaluate(Some(&record), today());
    assert_eq!(status.status, FitnessState::Expired);
    assert!(!status.near_expiry);
}

#[test]
fn near_expiry_flag_follows_warning_window() {
    let evaluator = FitnessEvaluator::new(7);

    let within = evaluator.evaluate(Some(&fitness_until(days_from_today(7))), today());
    assert_eq!(within.status, FitnessState::Valid);
    assert!(within.near_expiry);
    assert_eq!(within.days_remaining, Some(7));

    let outside = evaluator.evaluate(Some(&fitness_until(days_from_today(8))), today());
    assert_eq!(outside.status, FitnessState::Valid);
    assert!(!outside.near_expiry);
}

#[test]
fn open_ended_record_is_valid() {
    let record = FitnessRecord {
        valid: true,
        issued_at: Some(days_from_today(-30)),
        expires_at: None,
        invalidity_reason: None,
    };
    let status = FitnessEvaluator::default().evaluate(Some(&record), today());
    assert_eq!(status.status, FitnessState::Valid);
    assert_eq!(status.days_remaining, None);
    assert!(!status.near_expiry);
}
