use std::sync::Arc;

use axum::response::Response;
use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;

use crate::scheduling::domain::{
    EmployeeId, EmployeeShift, PersonDetails, Shift, ShiftDraft, ShiftId, StaffMember, StaffRole,
    VacationRequest, VacationRequestId,
};
use crate::scheduling::memory::{InMemorySchedulingRepository, RecordingNotifier};
use crate::scheduling::repository::{
    NotificationError, NotificationSender, RepositoryError, SchedulingRepository,
};
use crate::scheduling::{scheduling_router, SchedulingService, VacationOverlapPolicy};

pub(super) const MANAGER: &str = "mgr-ada";
pub(super) const OTHER_MANAGER: &str = "mgr-grace";
pub(super) const EMPLOYEE: &str = "emp-linus";
pub(super) const OTHER_EMPLOYEE: &str = "emp-barbara";

pub(super) type MemoryService = SchedulingService<InMemorySchedulingRepository, RecordingNotifier>;

pub(super) fn id(raw: &str) -> EmployeeId {
    EmployeeId(raw.to_string())
}

pub(super) fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, day).expect("valid date")
}

pub(super) fn at(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).expect("valid time")
}

pub(super) fn staff(raw_id: &str, manager: Option<&str>, role: StaffRole) -> StaffMember {
    StaffMember {
        id: id(raw_id),
        person: PersonDetails {
            first_name: raw_id.trim_start_matches("emp-").trim_start_matches("mgr-").to_string(),
            last_name: "Tester".to_string(),
            email: format!("{raw_id}@shiftwise.test"),
        },
        department: "Operations".to_string(),
        manager_id: manager.map(id),
        role,
    }
}

/// Two managers, each with one direct report.
pub(super) fn build_service_with_policy(
    policy: VacationOverlapPolicy,
) -> (
    MemoryService,
    Arc<InMemorySchedulingRepository>,
    Arc<RecordingNotifier>,
) {
    let repository = Arc::new(InMemorySchedulingRepository::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = SchedulingService::new(repository.clone(), notifier.clone(), policy);

    for member in [
        staff(MANAGER, None, StaffRole::Manager),
        staff(OTHER_MANAGER, None, StaffRole::Manager),
        staff(EMPLOYEE, Some(MANAGER), StaffRole::Employee),
        staff(OTHER_EMPLOYEE, Some(OTHER_MANAGER), StaffRole::Employee),
    ] {
        service.register_staff(member).expect("seed staff");
    }

    (service, repository, notifier)
}

pub(super) fn build_service() -> (
    MemoryService,
    Arc<InMemorySchedulingRepository>,
    Arc<RecordingNotifier>,
) {
    build_service_with_policy(VacationOverlapPolicy::Record)
}

pub(super) fn create_shift<R, N>(
    service: &SchedulingService<R, N>,
    day: u32,
    start: u32,
    end: u32,
) -> Shift
where
    R: SchedulingRepository + 'static,
    N: NotificationSender + 'static,
{
    service
        .create_shift(
            ShiftDraft {
                date: date(day),
                start_time: at(start),
                end_time: at(end),
                location_id: Some("loc-downtown".to_string()),
                shift_type_id: Some("type-day".to_string()),
            },
            &id(MANAGER),
        )
        .expect("shift created")
}

pub(super) fn pending_vacation<R, N>(
    service: &SchedulingService<R, N>,
    employee: &str,
    start_day: u32,
    end_day: u32,
) -> VacationRequest
where
    R: SchedulingRepository + 'static,
    N: NotificationSender + 'static,
{
    service
        .submit_vacation(
            &id(employee),
            date(start_day),
            date(end_day),
            Some("Family trip".to_string()),
        )
        .expect("vacation submitted")
}

/// Notifier whose transport is always down.
#[derive(Default)]
pub(super) struct FailingNotifier;

impl NotificationSender for FailingNotifier {
    fn shift_assigned(
        &self,
        _employee_id: &EmployeeId,
        _shift_id: &ShiftId,
    ) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp offline".to_string()))
    }

    fn vacation_status_changed(
        &self,
        _employee_id: &EmployeeId,
        _request_id: &VacationRequestId,
        _approved: bool,
    ) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp offline".to_string()))
    }
}

pub(super) struct UnavailableRepository;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl SchedulingRepository for UnavailableRepository {
    fn staff_member(&self, _id: &EmployeeId) -> Result<Option<StaffMember>, RepositoryError> {
        offline()
    }

    fn insert_staff_member(&self, _member: StaffMember) -> Result<StaffMember, RepositoryError> {
        offline()
    }

    fn team_of(&self, _manager_id: &EmployeeId) -> Result<Vec<StaffMember>, RepositoryError> {
        offline()
    }

    fn shift(&self, _id: &ShiftId) -> Result<Option<Shift>, RepositoryError> {
        offline()
    }

    fn insert_shift(&self, _shift: Shift) -> Result<Shift, RepositoryError> {
        offline()
    }

    fn assignment(
        &self,
        _employee_id: &EmployeeId,
        _shift_id: &ShiftId,
    ) -> Result<Option<EmployeeShift>, RepositoryError> {
        offline()
    }

    fn overlapping_assignments(
        &self,
        _employee_id: &EmployeeId,
        _date: NaiveDate,
        _start: NaiveTime,
        _end: NaiveTime,
    ) -> Result<Vec<EmployeeShift>, RepositoryError> {
        offline()
    }

    fn assignments_for(
        &self,
        _employee_id: &EmployeeId,
    ) -> Result<Vec<EmployeeShift>, RepositoryError> {
        offline()
    }

    fn insert_assignment(
        &self,
        _assignment: EmployeeShift,
    ) -> Result<EmployeeShift, RepositoryError> {
        offline()
    }

    fn vacation(
        &self,
        _id: &VacationRequestId,
    ) -> Result<Option<VacationRequest>, RepositoryError> {
        offline()
    }

    fn insert_vacation(
        &self,
        _request: VacationRequest,
    ) -> Result<VacationRequest, RepositoryError> {
        offline()
    }

    fn update_vacation(&self, _request: VacationRequest) -> Result<(), RepositoryError> {
        offline()
    }

    fn approved_vacations_overlapping(
        &self,
        _employee_id: &EmployeeId,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<VacationRequest>, RepositoryError> {
        offline()
    }

    fn vacations_for(
        &self,
        _employee_id: &EmployeeId,
    ) -> Result<Vec<VacationRequest>, RepositoryError> {
        offline()
    }
}

/// Store whose pre-insert lookups never see existing assignments, leaving the unique
/// (employee, shift) key as the only guard.
#[derive(Default)]
pub(super) struct StaleLookupRepository {
    pub(super) inner: InMemorySchedulingRepository,
}

impl SchedulingRepository for StaleLookupRepository {
    fn staff_member(&self, id: &EmployeeId) -> Result<Option<StaffMember>, RepositoryError> {
        self.inner.staff_member(id)
    }

    fn insert_staff_member(&self, member: StaffMember) -> Result<StaffMember, RepositoryError> {
        self.inner.insert_staff_member(member)
    }

    fn team_of(&self, manager_id: &EmployeeId) -> Result<Vec<StaffMember>, RepositoryError> {
        self.inner.team_of(manager_id)
    }

    fn shift(&self, id: &ShiftId) -> Result<Option<Shift>, RepositoryError> {
        self.inner.shift(id)
    }

    fn insert_shift(&self, shift: Shift) -> Result<Shift, RepositoryError> {
        self.inner.insert_shift(shift)
    }

    fn assignment(
        &self,
        _employee_id: &EmployeeId,
        _shift_id: &ShiftId,
    ) -> Result<Option<EmployeeShift>, RepositoryError> {
        Ok(None)
    }

    fn overlapping_assignments(
        &self,
        _employee_id: &EmployeeId,
        _date: NaiveDate,
        _start: NaiveTime,
        _end: NaiveTime,
    ) -> Result<Vec<EmployeeShift>, RepositoryError> {
        Ok(Vec::new())
    }

    fn assignments_for(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<EmployeeShift>, RepositoryError> {
        self.inner.assignments_for(employee_id)
    }

    fn insert_assignment(
        &self,
        assignment: EmployeeShift,
    ) -> Result<EmployeeShift, RepositoryError> {
        self.inner.insert_assignment(assignment)
    }

    fn vacation(
        &self,
        id: &VacationRequestId,
    ) -> Result<Option<VacationRequest>, RepositoryError> {
        self.inner.vacation(id)
    }

    fn insert_vacation(
        &self,
        request: VacationRequest,
    ) -> Result<VacationRequest, RepositoryError> {
        self.inner.insert_vacation(request)
    }

    fn update_vacation(&self, request: VacationRequest) -> Result<(), RepositoryError> {
        self.inner.update_vacation(request)
    }

    fn approved_vacations_overlapping(
        &self,
        employee_id: &EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<VacationRequest>, RepositoryError> {
        self.inner.approved_vacations_overlapping(employee_id, start, end)
    }

    fn vacations_for(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<VacationRequest>, RepositoryError> {
        self.inner.vacations_for(employee_id)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    scheduling_router(Arc::new(service))
}
