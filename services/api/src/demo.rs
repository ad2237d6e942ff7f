use crate::infra::{
    parse_date, sample_family, InMemoryGuestListStore, InMemoryMemberDirectory, SAMPLE_TITULAR_ID,
};
use chrono::{Local, NaiveDate};
use clap::Args;
use club_admission::admission::{
    AdmissionConfig, AdmissionError, AdmissionRequest, AdmissionService, DailyGuestList,
    FitnessEvaluator, FitnessRecord, FixedClock, GuestListKey, GuestRegistration, PaymentMethod,
    TitularId,
};
use club_admission::error::AppError;
use std::sync::Arc;

type DemoService = AdmissionService<InMemoryGuestListStore, InMemoryMemberDirectory>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Club day to simulate (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct FitnessArgs {
    /// Whether the medical certificate was accepted as valid
    #[arg(long)]
    pub(crate) valid: bool,
    /// Expiry date of the certificate (YYYY-MM-DD); omit for open-ended certificates
    #[arg(long, value_parser = parse_date)]
    pub(crate) expires: Option<NaiveDate>,
    /// Evaluation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Reason recorded when the certificate was rejected
    #[arg(long)]
    pub(crate) reason: Option<String>,
    /// Days before expiry that trigger the near-expiry warning
    #[arg(long, default_value_t = 7)]
    pub(crate) warning_days: u32,
}

pub(crate) fn run_fitness_check(args: FitnessArgs) -> Result<(), AppError> {
    let FitnessArgs {
        valid,
        expires,
        today,
        reason,
        warning_days,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let record = FitnessRecord {
        valid,
        issued_at: None,
        expires_at: expires,
        invalidity_reason: reason,
    };
    let status = FitnessEvaluator::new(warning_days).evaluate(Some(&record), today);

    println!("Medical fitness as of {today}");
    println!("- status: {}", status.status.label());
    println!("- {}", status.message);
    if let Some(days) = status.days_remaining {
        println!("- days remaining: {days}");
    }
    if status.near_expiry {
        println!("- renewal due soon");
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let family = sample_family(today);
    let titular_id = TitularId(SAMPLE_TITULAR_ID.to_string());
    let service: DemoService = AdmissionService::new(
        Arc::new(InMemoryGuestListStore::default()),
        Arc::new(InMemoryMemberDirectory::seeded([family.clone()])),
        Arc::new(FixedClock::new(today)),
        AdmissionConfig::default(),
    );
    let key = GuestListKey::new(titular_id.clone(), today);

    println!("Club admission demo for {today}");
    println!(
        "Titular {} {} ({}) with {} family member(s) and {} adherent(s)",
        family.first_name,
        family.last_name,
        family.dni,
        family.family_members.len(),
        family.adherents.len()
    );

    println!("\nGuest list");
    let guests = [
        demo_guest("Carmen", "Vidal", "30111222", "1992-04-18"),
        demo_guest("Diego", "Ferrer", "31222333", "1988-11-02"),
        demo_guest("Nina", "Ferrer", "60333444", "2024-08-09"),
    ];
    for guest in guests.into_iter().flatten() {
        let label = format!("{} {}", guest.first_name, guest.last_name);
        outcome(&label, service.add_guest(&key, guest).map(|_| "registered"));
    }
    report_send(&service, &key);

    println!("\nGate (before any member arrives)");
    outcome(
        "Carmen Vidal",
        service
            .admit_guest(&key, "30111222", AdmissionRequest::default())
            .map(|_| "admitted"),
    );

    println!("\nMember entries");
    let mut members = vec![family.dni.clone()];
    members.extend(family.family_members.iter().map(|member| member.dni.clone()));
    members.extend(family.adherents.iter().map(|adherent| adherent.dni.clone()));
    for dni in members {
        match service.record_member_entry(&titular_id, &dni) {
            Ok(entry) => println!(
                "  {} {}: {}",
                entry.decision.role.label(),
                dni,
                entry.decision.reason
            ),
            Err(err) => println!("  {dni}: rejected ({err})"),
        }
    }

    println!("\nGuest admissions");
    outcome(
        "Nina Ferrer",
        service
            .admit_guest(&key, "60333444", AdmissionRequest::default())
            .map(|_| "admitted free (under 3)"),
    );
    outcome(
        "Diego Ferrer",
        service
            .admit_guest(&key, "31222333", AdmissionRequest::default())
            .map(|_| "admitted"),
    );
    outcome(
        "Diego Ferrer",
        service
            .admit_guest(
                &key,
                "31222333",
                AdmissionRequest {
                    payment_method: Some(PaymentMethod::Cash),
                    birthday_guest: false,
                },
            )
            .map(|_| "admitted, paid cash"),
    );
    outcome(
        "Carmen Vidal",
        service
            .admit_guest(
                &key,
                "30111222",
                AdmissionRequest {
                    payment_method: None,
                    birthday_guest: true,
                },
            )
            .map(|_| "admitted as birthday guest"),
    );

    let view = service.view_list(&key)?;
    println!("\nBirthday quota");
    println!(
        "- {} celebrating member(s) | {} of {} slot(s) used | {} remaining{}",
        view.quota.birthday_members,
        view.quota.used,
        view.quota.total_quota,
        view.quota.remaining,
        if view.quota.restricted {
            " | restricted date"
        } else {
            ""
        }
    );
    print_list(&view.list);

    let processed = service.process_list(&key)?;
    println!("\nList {} is now {}", processed.id, processed.state);
    Ok(())
}

fn demo_guest(
    first_name: &str,
    last_name: &str,
    dni: &str,
    birth_date: &str,
) -> Option<GuestRegistration> {
    let birth_date = parse_date(birth_date).ok()?;
    Some(GuestRegistration {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        dni: dni.to_string(),
        birth_date,
    })
}

fn outcome(label: &str, result: Result<&str, AdmissionError>) {
    match result {
        Ok(done) => println!("  {label}: {done}"),
        Err(err) => println!("  {label}: rejected [{}] {err}", err.kind()),
    }
}

fn report_send(service: &DemoService, key: &GuestListKey) {
    match service.send_list(key) {
        Ok(list) => println!(
            "  list {} sent with {} guest(s)",
            list.id,
            list.guests.len()
        ),
        Err(err) => println!("  list not sent: {err}"),
    }
}

fn print_list(list: &DailyGuestList) {
    println!("\nGuests on {} ({})", list.date, list.state);
    for guest in &list.guests {
        let classification = match (guest.entered, guest.is_birthday_guest, guest.payment_method) {
            (false, _, _) => "waiting".to_string(),
            (true, true, _) => "entered, birthday guest".to_string(),
            (true, false, Some(method)) => format!("entered, paid {}", method.label()),
            (true, false, None) => "entered, free".to_string(),
        };
        println!(
            "  - {} {} ({}): {}",
            guest.first_name, guest.last_name, guest.dni, classification
        );
    }
}
