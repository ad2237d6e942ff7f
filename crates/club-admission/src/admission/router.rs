use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::{GuestListKey, GuestRegistration, TitularId};
use super::error::AdmissionError;
use super::guest_list::CancelledBy;
use super::ports::{GuestListStore, MemberDirectory, StoreError};
use super::service::{AdmissionRequest, AdmissionService};

type SharedService<S, D> = Arc<AdmissionService<S, D>>;

#[derive(Debug, Deserialize)]
pub(crate) struct CancelRequest {
    pub(crate) by: CancelledBy,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BirthdayFlagRequest {
    pub(crate) flag: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MemberEntryRequest {
    pub(crate) titular_id: String,
    pub(crate) dni: String,
}

/// Router builder exposing guest-list, admission and gate endpoints.
pub fn admission_router<S, D>(service: SharedService<S, D>) -> Router
where
    S: GuestListStore + 'static,
    D: MemberDirectory + 'static,
{
    let list = "/api/v1/guest-lists/:titular_id/:date";

    Router::new()
        .route(list, get(view_handler::<S, D>))
        .route(&format!("{list}/guests"), post(add_guest_handler::<S, D>))
        .route(
            &format!("{list}/guests/:dni"),
            delete(remove_guest_handler::<S, D>),
        )
        .route(&format!("{list}/send"), post(send_handler::<S, D>))
        .route(&format!("{list}/cancel"), post(cancel_handler::<S, D>))
        .route(&format!("{list}/process"), post(process_handler::<S, D>))
        .route(
            &format!("{list}/guests/:dni/admit"),
            post(admit_handler::<S, D>),
        )
        .route(
            &format!("{list}/guests/:dni/revoke"),
            post(revoke_handler::<S, D>),
        )
        .route(
            &format!("{list}/guests/:dni/birthday"),
            post(birthday_handler::<S, D>),
        )
        .route("/api/v1/entries", post(member_entry_handler::<S, D>))
        .route(
            "/api/v1/members/:titular_id/entry-check/:dni",
            get(entry_check_handler::<S, D>),
        )
        .with_state(service)
}

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdmissionError::Validation(_) | AdmissionError::PaymentMethodRequired => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AdmissionError::GateClosed
            | AdmissionError::QuotaExceeded { .. }
            | AdmissionError::RestrictedDate(_)
            | AdmissionError::NotEditable { .. }
            | AdmissionError::NotSendable { .. }
            | AdmissionError::InvalidTransition { .. }
            | AdmissionError::EntryDenied(_)
            | AdmissionError::AlreadyEntered(_)
            | AdmissionError::NotEntered(_)
            | AdmissionError::Persistence(StoreError::Conflict) => StatusCode::CONFLICT,
            AdmissionError::ListNotFound(_)
            | AdmissionError::GuestNotFound(_)
            | AdmissionError::TitularNotFound(_)
            | AdmissionError::PersonNotFound { .. } => StatusCode::NOT_FOUND,
            AdmissionError::Persistence(StoreError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        };

        let payload = json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        (status, Json(payload)).into_response()
    }
}

fn list_key(titular_id: String, date: NaiveDate) -> GuestListKey {
    GuestListKey::new(TitularId(titular_id), date)
}

fn respond<T: serde::Serialize>(result: Result<T, AdmissionError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn view_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path((titular_id, date)): Path<(String, NaiveDate)>,
) -> Response
where
    S: GuestListStore + 'static,
    D: MemberDirectory + 'static,
{
    respond(service.view_list(&list_key(titular_id, date)))
}

pub(crate) async fn add_guest_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path((titular_id, date)): Path<(String, NaiveDate)>,
    Json(registration): Json<GuestRegistration>,
) -> Response
where
    S: GuestListStore + 'static,
    D: MemberDirectory + 'static,
{
    match service.add_guest(&list_key(titular_id, date), registration) {
        Ok(list) => (StatusCode::CREATED, Json(list)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn remove_guest_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path((titular_id, date, dni)): Path<(String, NaiveDate, String)>,
) -> Response
where
    S: GuestListStore + 'static,
    D: MemberDirectory + 'static,
{
    respond(service.remove_guest(&list_key(titular_id, date), &dni))
}

pub(crate) async fn send_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path((titular_id, date)): Path<(String, NaiveDate)>,
) -> Response
where
    S: GuestListStore + 'static,
    D: MemberDirectory + 'static,
{
    respond(service.send_list(&list_key(titular_id, date)))
}

pub(crate) async fn cancel_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path((titular_id, date)): Path<(String, NaiveDate)>,
    Json(request): Json<CancelRequest>,
) -> Response
where
    S: GuestListStore + 'static,
    D: MemberDirectory + 'static,
{
    respond(service.cancel_list(&list_key(titular_id, date), request.by))
}

pub(crate) async fn process_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path((titular_id, date)): Path<(String, NaiveDate)>,
) -> Response
where
    S: GuestListStore + 'static,
    D: MemberDirectory + 'static,
{
    respond(service.process_list(&list_key(titular_id, date)))
}

pub(crate) async fn admit_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path((titular_id, date, dni)): Path<(String, NaiveDate, String)>,
    Json(request): Json<AdmissionRequest>,
) -> Response
where
    S: GuestListStore + 'static,
    D: MemberDirectory + 'static,
{
    respond(service.admit_guest(&list_key(titular_id, date), &dni, request))
}

pub(crate) async fn revoke_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path((titular_id, date, dni)): Path<(String, NaiveDate, String)>,
) -> Response
where
    S: GuestListStore + 'static,
    D: MemberDirectory + 'static,
{
    respond(service.revoke_guest(&list_key(titular_id, date), &dni))
}

pub(crate) async fn birthday_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path((titular_id, date, dni)): Path<(String, NaiveDate, String)>,
    Json(request): Json<BirthdayFlagRequest>,
) -> Response
where
    S: GuestListStore + 'static,
    D: MemberDirectory + 'static,
{
    respond(service.set_birthday_flag(&list_key(titular_id, date), &dni, request.flag))
}

pub(crate) async fn member_entry_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Json(request): Json<MemberEntryRequest>,
) -> Response
where
    S: GuestListStore + 'static,
    D: MemberDirectory + 'static,
{
    let titular_id = TitularId(request.titular_id);
    match service.record_member_entry(&titular_id, &request.dni) {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn entry_check_handler<S, D>(
    State(service): State<SharedService<S, D>>,
    Path((titular_id, dni)): Path<(String, String)>,
) -> Response
where
    S: GuestListStore + 'static,
    D: MemberDirectory + 'static,
{
    respond(service.check_entry(&TitularId(titular_id), &dni))
}
