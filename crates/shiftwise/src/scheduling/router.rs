use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::domain::{
    EmployeeId, EmployeeShift, ShiftDraft, ShiftId, StaffMember, VacationRequestId,
};
use super::repository::{NotificationSender, RepositoryError, SchedulingRepository};
use super::service::{SchedulingError, SchedulingService};
use super::team::TeamView;
use super::vacation::VacationViolation;

type SharedService<R, N> = Arc<SchedulingService<R, N>>;

/// Router builder exposing staff, shift, assignment, and vacation endpoints.
pub fn scheduling_router<R, N>(service: SharedService<R, N>) -> Router
where
    R: SchedulingRepository + 'static,
    N: NotificationSender + 'static,
{
    Router::new()
        .route("/api/v1/staff", post(register_staff_handler::<R, N>))
        .route(
            "/api/v1/managers/:manager_id/team",
            get(team_handler::<R, N>),
        )
        .route("/api/v1/shifts", post(create_shift_handler::<R, N>))
        .route("/api/v1/shifts/:shift_id", get(shift_handler::<R, N>))
        .route(
            "/api/v1/shifts/:shift_id/assignments",
            post(assign_handler::<R, N>),
        )
        .route(
            "/api/v1/employees/:employee_id/shifts",
            get(schedule_handler::<R, N>),
        )
        .route(
            "/api/v1/employees/:employee_id/vacations",
            get(employee_vacations_handler::<R, N>),
        )
        .route("/api/v1/vacations", post(submit_vacation_handler::<R, N>))
        .route(
            "/api/v1/vacations/:request_id",
            get(vacation_handler::<R, N>),
        )
        .route(
            "/api/v1/vacations/:request_id/approve",
            post(approve_handler::<R, N>),
        )
        .route(
            "/api/v1/vacations/:request_id/reject",
            post(reject_handler::<R, N>),
        )
        .route(
            "/api/v1/vacations/:request_id/cancel",
            post(cancel_handler::<R, N>),
        )
        .with_state(service)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShiftRequest {
    pub created_by: EmployeeId,
    #[serde(flatten)]
    pub draft: ShiftDraft,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignShiftRequest {
    pub employee_id: EmployeeId,
    pub manager_id: EmployeeId,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignShiftResponse {
    pub assigned: bool,
    pub assignment: EmployeeShift,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleQuery {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitVacationRequest {
    pub employee_id: EmployeeId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewVacationRequest {
    pub manager_id: EmployeeId,
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelVacationRequest {
    pub employee_id: EmployeeId,
}

pub(crate) fn status_for(error: &SchedulingError) -> StatusCode {
    match error {
        SchedulingError::NotFound { .. }
        | SchedulingError::Repository(RepositoryError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        SchedulingError::Assignment(violation) if violation.is_authorization() => {
            StatusCode::FORBIDDEN
        }
        SchedulingError::Vacation(violation) if violation.is_authorization() => {
            StatusCode::FORBIDDEN
        }
        SchedulingError::Shift(_)
        | SchedulingError::Vacation(VacationViolation::InvalidDateRange) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SchedulingError::Assignment(_)
        | SchedulingError::Vacation(_)
        | SchedulingError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        SchedulingError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(error: SchedulingError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        error!(%error, "scheduling request failed");
    }
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

fn rejection_response(status: StatusCode, message: String) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}

fn json_body<T>(payload: Result<axum::Json<T>, JsonRejection>) -> Result<T, Response> {
    payload
        .map(|axum::Json(body)| body)
        .map_err(|rejection| rejection_response(rejection.status(), rejection.body_text()))
}

pub(crate) async fn register_staff_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    payload: Result<axum::Json<StaffMember>, JsonRejection>,
) -> Response
where
    R: SchedulingRepository + 'static,
    N: NotificationSender + 'static,
{
    let member = match json_body(payload) {
        Ok(member) => member,
        Err(response) => return response,
    };
    match service.register_staff(member) {
        Ok(member) => (StatusCode::CREATED, axum::Json(member)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn team_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(manager_id): Path<String>,
) -> Response
where
    R: SchedulingRepository + 'static,
    N: NotificationSender + 'static,
{
    let manager_id = EmployeeId(manager_id);
    match service.team(&manager_id) {
        Ok(members) => {
            let view = TeamView::new(manager_id, &members);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_shift_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    payload: Result<axum::Json<CreateShiftRequest>, JsonRejection>,
) -> Response
where
    R: SchedulingRepository + 'static,
    N: NotificationSender + 'static,
{
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match service.create_shift(request.draft, &request.created_by) {
        Ok(shift) => (StatusCode::CREATED, axum::Json(shift)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn shift_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(shift_id): Path<String>,
) -> Response
where
    R: SchedulingRepository + 'static,
    N: NotificationSender + 'static,
{
    match service.shift(&ShiftId(shift_id)) {
        Ok(shift) => (StatusCode::OK, axum::Json(shift)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn assign_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(shift_id): Path<String>,
    payload: Result<axum::Json<AssignShiftRequest>, JsonRejection>,
) -> Response
where
    R: SchedulingRepository + 'static,
    N: NotificationSender + 'static,
{
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let shift_id = ShiftId(shift_id);
    match service.assign_shift(&shift_id, &request.employee_id, &request.manager_id) {
        Ok(assignment) => {
            let body = AssignShiftResponse {
                assigned: true,
                assignment,
            };
            (StatusCode::CREATED, axum::Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn schedule_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(employee_id): Path<String>,
    query: Result<Query<ScheduleQuery>, QueryRejection>,
) -> Response
where
    R: SchedulingRepository + 'static,
    N: NotificationSender + 'static,
{
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    match service.employee_schedule(&EmployeeId(employee_id), query.from, query.to) {
        Ok(schedule) => (StatusCode::OK, axum::Json(schedule)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn employee_vacations_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(employee_id): Path<String>,
) -> Response
where
    R: SchedulingRepository + 'static,
    N: NotificationSender + 'static,
{
    match service.vacations_for(&EmployeeId(employee_id)) {
        Ok(requests) => (StatusCode::OK, axum::Json(requests)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_vacation_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    payload: Result<axum::Json<SubmitVacationRequest>, JsonRejection>,
) -> Response
where
    R: SchedulingRepository + 'static,
    N: NotificationSender + 'static,
{
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match service.submit_vacation(
        &request.employee_id,
        request.start_date,
        request.end_date,
        request.reason,
    ) {
        Ok(stored) => (StatusCode::CREATED, axum::Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn vacation_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(request_id): Path<String>,
) -> Response
where
    R: SchedulingRepository + 'static,
    N: NotificationSender + 'static,
{
    match service.vacation(&VacationRequestId(request_id)) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approve_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(request_id): Path<String>,
    payload: Result<axum::Json<ReviewVacationRequest>, JsonRejection>,
) -> Response
where
    R: SchedulingRepository + 'static,
    N: NotificationSender + 'static,
{
    let review = match json_body(payload) {
        Ok(review) => review,
        Err(response) => return response,
    };
    let request_id = VacationRequestId(request_id);
    match service.approve_vacation(&request_id, &review.manager_id, review.comments) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reject_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(request_id): Path<String>,
    payload: Result<axum::Json<ReviewVacationRequest>, JsonRejection>,
) -> Response
where
    R: SchedulingRepository + 'static,
    N: NotificationSender + 'static,
{
    let review = match json_body(payload) {
        Ok(review) => review,
        Err(response) => return response,
    };
    let request_id = VacationRequestId(request_id);
    match service.reject_vacation(&request_id, &review.manager_id, review.comments) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cancel_handler<R, N>(
    State(service): State<SharedService<R, N>>,
    Path(request_id): Path<String>,
    payload: Result<axum::Json<CancelVacationRequest>, JsonRejection>,
) -> Response
where
    R: SchedulingRepository + 'static,
    N: NotificationSender + 'static,
{
    let cancel = match json_body(payload) {
        Ok(cancel) => cancel,
        Err(response) => return response,
    };
    let request_id = VacationRequestId(request_id);
    match service.cancel_vacation(&request_id, &cancel.employee_id) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(error) => error_response(error),
    }
}
