use chrono::{NaiveDate, NaiveTime};

use super::domain::{
    EmployeeId, EmployeeShift, Shift, ShiftId, StaffMember, VacationRequest, VacationRequestId,
};

/// Storage abstraction so the scheduling rules can be exercised without a database.
///
/// Implementations must reject a second assignment for the same (employee, shift) pair with
/// [`RepositoryError::Conflict`]; the service relies on that as a backstop behind its own check.
pub trait SchedulingRepository: Send + Sync {
    fn staff_member(&self, id: &EmployeeId) -> Result<Option<StaffMember>, RepositoryError>;
    fn insert_staff_member(&self, member: StaffMember) -> Result<StaffMember, RepositoryError>;
    fn team_of(&self, manager_id: &EmployeeId) -> Result<Vec<StaffMember>, RepositoryError>;

    fn shift(&self, id: &ShiftId) -> Result<Option<Shift>, RepositoryError>;
    fn insert_shift(&self, shift: Shift) -> Result<Shift, RepositoryError>;

    fn assignment(
        &self,
        employee_id: &EmployeeId,
        shift_id: &ShiftId,
    ) -> Result<Option<EmployeeShift>, RepositoryError>;

    /// Non-cancelled assignments of `employee_id` whose shift falls on `date` and intersects
    /// the half-open window `[start, end)`.
    fn overlapping_assignments(
        &self,
        employee_id: &EmployeeId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Vec<EmployeeShift>, RepositoryError>;

    fn assignments_for(&self, employee_id: &EmployeeId)
        -> Result<Vec<EmployeeShift>, RepositoryError>;
    fn insert_assignment(
        &self,
        assignment: EmployeeShift,
    ) -> Result<EmployeeShift, RepositoryError>;

    fn vacation(&self, id: &VacationRequestId) -> Result<Option<VacationRequest>, RepositoryError>;
    fn insert_vacation(&self, request: VacationRequest)
        -> Result<VacationRequest, RepositoryError>;
    fn update_vacation(&self, request: VacationRequest) -> Result<(), RepositoryError>;

    /// Approved requests of `employee_id` overlapping the inclusive range `[start, end]`.
    fn approved_vacations_overlapping(
        &self,
        employee_id: &EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<VacationRequest>, RepositoryError>;

    fn vacations_for(&self, employee_id: &EmployeeId)
        -> Result<Vec<VacationRequest>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notification hooks (e-mail, push, or an in-app inbox).
pub trait NotificationSender: Send + Sync {
    fn shift_assigned(
        &self,
        employee_id: &EmployeeId,
        shift_id: &ShiftId,
    ) -> Result<(), NotificationError>;

    fn vacation_status_changed(
        &self,
        employee_id: &EmployeeId,
        request_id: &VacationRequestId,
        approved: bool,
    ) -> Result<(), NotificationError>;
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
