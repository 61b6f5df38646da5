use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use super::assignment::{AssignmentViolation, ShiftAssignmentValidator};
use super::domain::{
    AssignmentId, EmployeeId, EmployeeShift, ScheduledShift, Shift, ShiftDraft, ShiftId,
    ShiftViolation, StaffMember, VacationRequest, VacationRequestId, VacationStatus,
};
use super::repository::{NotificationSender, RepositoryError, SchedulingRepository};
use super::team::team_members;
use super::vacation::{
    ApprovalOutcome, VacationApprovalArbiter, VacationOverlapPolicy, VacationViolation,
};

static SHIFT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ASSIGNMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static VACATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_shift_id() -> ShiftId {
    let id = SHIFT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ShiftId(format!("shf-{id:06}"))
}

fn next_assignment_id() -> AssignmentId {
    let id = ASSIGNMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssignmentId(format!("asg-{id:06}"))
}

fn next_vacation_id() -> VacationRequestId {
    let id = VACATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    VacationRequestId(format!("vac-{id:06}"))
}

/// Service composing the record store, the notification sender, and the scheduling rules.
///
/// Every mutating operation holds the service's write lock from its first read to its last
/// write, so a check-then-insert sequence cannot interleave with another one.
pub struct SchedulingService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    arbiter: VacationApprovalArbiter,
    writes: Mutex<()>,
}

impl<R, N> SchedulingService<R, N>
where
    R: SchedulingRepository + 'static,
    N: NotificationSender + 'static,
{
    pub fn new(
        repository: Arc<R>,
        notifier: Arc<N>,
        overlap_policy: VacationOverlapPolicy,
    ) -> Self {
        Self {
            repository,
            notifier,
            arbiter: VacationApprovalArbiter::new(overlap_policy),
            writes: Mutex::new(()),
        }
    }

    pub fn overlap_policy(&self) -> VacationOverlapPolicy {
        self.arbiter.policy()
    }

    fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register_staff(&self, member: StaffMember) -> Result<StaffMember, SchedulingError> {
        let _guard = self.write_guard();
        if let Some(manager_id) = &member.manager_id {
            require_manager(self.repository.as_ref(), manager_id)?;
        }
        Ok(self.repository.insert_staff_member(member)?)
    }

    pub fn team(&self, manager_id: &EmployeeId) -> Result<Vec<StaffMember>, SchedulingError> {
        team_members(self.repository.as_ref(), manager_id)
    }

    pub fn create_shift(
        &self,
        draft: ShiftDraft,
        created_by: &EmployeeId,
    ) -> Result<Shift, SchedulingError> {
        let _guard = self.write_guard();
        let manager = require_manager(self.repository.as_ref(), created_by)?;

        let shift = Shift {
            id: next_shift_id(),
            date: draft.date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            location_id: draft.location_id,
            shift_type_id: draft.shift_type_id,
            created_by: manager.id,
        };
        if !shift.has_valid_window() {
            return Err(ShiftViolation::InvalidWindow {
                date: shift.date,
                start: shift.start_time,
                end: shift.end_time,
            }
            .into());
        }

        Ok(self.repository.insert_shift(shift)?)
    }

    pub fn shift(&self, shift_id: &ShiftId) -> Result<Shift, SchedulingError> {
        require_shift(self.repository.as_ref(), shift_id)
    }

    /// Assign `employee_id` to `shift_id` on behalf of `manager_id`.
    pub fn assign_shift(
        &self,
        shift_id: &ShiftId,
        employee_id: &EmployeeId,
        manager_id: &EmployeeId,
    ) -> Result<EmployeeShift, SchedulingError> {
        let _guard = self.write_guard();

        let cleared = ShiftAssignmentValidator::new(self.repository.as_ref()).validate(
            shift_id,
            employee_id,
            manager_id,
        )?;
        let assignment = cleared.into_assignment(next_assignment_id(), Utc::now());

        let stored = match self.repository.insert_assignment(assignment) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => {
                return Err(AssignmentViolation::AlreadyAssigned {
                    employee_id: employee_id.clone(),
                    shift_id: shift_id.clone(),
                }
                .into());
            }
            Err(other) => return Err(other.into()),
        };

        info!(
            assignment_id = %stored.id,
            employee_id = %stored.employee_id,
            shift_id = %stored.shift_id,
            manager_id = %stored.assigned_by,
            "shift assigned"
        );

        if let Err(error) = self
            .notifier
            .shift_assigned(&stored.employee_id, &stored.shift_id)
        {
            warn!(%error, assignment_id = %stored.id, "shift assignment notification failed");
        }

        Ok(stored)
    }

    /// Assignments of `employee_id` joined with their shifts, ordered by date and start time.
    pub fn employee_schedule(
        &self,
        employee_id: &EmployeeId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<ScheduledShift>, SchedulingError> {
        let employee = require_staff(self.repository.as_ref(), employee_id)?;

        let mut schedule = Vec::new();
        for assignment in self.repository.assignments_for(&employee.id)? {
            let Some(shift) = self.repository.shift(&assignment.shift_id)? else {
                warn!(
                    assignment_id = %assignment.id,
                    shift_id = %assignment.shift_id,
                    "assignment references missing shift"
                );
                continue;
            };
            if from.is_some_and(|from| shift.date < from) || to.is_some_and(|to| shift.date > to) {
                continue;
            }
            schedule.push(ScheduledShift { assignment, shift });
        }
        schedule.sort_by(|a, b| {
            (a.shift.date, a.shift.start_time).cmp(&(b.shift.date, b.shift.start_time))
        });
        Ok(schedule)
    }

    pub fn submit_vacation(
        &self,
        employee_id: &EmployeeId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: Option<String>,
    ) -> Result<VacationRequest, SchedulingError> {
        let _guard = self.write_guard();
        let employee = require_staff(self.repository.as_ref(), employee_id)?;
        if end_date < start_date {
            return Err(VacationViolation::InvalidDateRange.into());
        }

        let request = VacationRequest {
            id: next_vacation_id(),
            employee_id: employee.id,
            start_date,
            end_date,
            reason,
            status: VacationStatus::Pending,
            requested_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
        };
        Ok(self.repository.insert_vacation(request)?)
    }

    pub fn vacation(
        &self,
        request_id: &VacationRequestId,
    ) -> Result<VacationRequest, SchedulingError> {
        require_vacation(self.repository.as_ref(), request_id)
    }

    pub fn vacations_for(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<VacationRequest>, SchedulingError> {
        let employee = require_staff(self.repository.as_ref(), employee_id)?;
        Ok(self.repository.vacations_for(&employee.id)?)
    }

    /// Approve a pending vacation request as `manager_id`.
    pub fn approve_vacation(
        &self,
        request_id: &VacationRequestId,
        manager_id: &EmployeeId,
        comments: Option<String>,
    ) -> Result<ApprovalOutcome, SchedulingError> {
        let _guard = self.write_guard();
        let manager = require_manager(self.repository.as_ref(), manager_id)?;
        let request = require_vacation(self.repository.as_ref(), request_id)?;

        let outcome = self.arbiter.approve(
            self.repository.as_ref(),
            request,
            &manager,
            comments,
            Utc::now(),
        )?;
        self.repository.update_vacation(outcome.request.clone())?;

        info!(
            request_id = %outcome.request.id,
            employee_id = %outcome.request.employee_id,
            manager_id = %manager.id,
            overlapping = outcome.overlapping_approved.len(),
            "vacation approved"
        );
        self.notify_vacation(&outcome.request, true);

        Ok(outcome)
    }

    pub fn reject_vacation(
        &self,
        request_id: &VacationRequestId,
        manager_id: &EmployeeId,
        comments: Option<String>,
    ) -> Result<VacationRequest, SchedulingError> {
        let _guard = self.write_guard();
        let manager = require_manager(self.repository.as_ref(), manager_id)?;
        let request = require_vacation(self.repository.as_ref(), request_id)?;

        let request = self
            .arbiter
            .reject(request, &manager, comments, Utc::now())?;
        self.repository.update_vacation(request.clone())?;

        info!(request_id = %request.id, manager_id = %manager.id, "vacation rejected");
        self.notify_vacation(&request, false);

        Ok(request)
    }

    pub fn cancel_vacation(
        &self,
        request_id: &VacationRequestId,
        employee_id: &EmployeeId,
    ) -> Result<VacationRequest, SchedulingError> {
        let _guard = self.write_guard();
        let employee = require_staff(self.repository.as_ref(), employee_id)?;
        let request = require_vacation(self.repository.as_ref(), request_id)?;

        let request = self.arbiter.cancel(request, &employee.id)?;
        self.repository.update_vacation(request.clone())?;

        info!(request_id = %request.id, employee_id = %employee_id, "vacation cancelled");
        Ok(request)
    }

    fn notify_vacation(&self, request: &VacationRequest, approved: bool) {
        if let Err(error) =
            self.notifier
                .vacation_status_changed(&request.employee_id, &request.id, approved)
        {
            warn!(%error, request_id = %request.id, "vacation status notification failed");
        }
    }
}

/// Kind of record a lookup failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Employee,
    Manager,
    Shift,
    VacationRequest,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Employee => "employee",
            EntityKind::Manager => "manager",
            EntityKind::Shift => "shift",
            EntityKind::VacationRequest => "vacation request",
        };
        f.write_str(label)
    }
}

/// Error raised by the scheduling service.
#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: String },
    #[error(transparent)]
    Shift(#[from] ShiftViolation),
    #[error(transparent)]
    Assignment(#[from] AssignmentViolation),
    #[error(transparent)]
    Vacation(#[from] VacationViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SchedulingError {
    fn not_found(entity: EntityKind, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SchedulingError::NotFound { .. }
                | SchedulingError::Repository(RepositoryError::NotFound)
        )
    }
}

pub(crate) fn require_staff<R>(
    repository: &R,
    id: &EmployeeId,
) -> Result<StaffMember, SchedulingError>
where
    R: SchedulingRepository + ?Sized,
{
    repository
        .staff_member(id)?
        .ok_or_else(|| SchedulingError::not_found(EntityKind::Employee, id))
}

/// Resolves a staff member holding the manager role; anyone else counts as a miss.
pub(crate) fn require_manager<R>(
    repository: &R,
    id: &EmployeeId,
) -> Result<StaffMember, SchedulingError>
where
    R: SchedulingRepository + ?Sized,
{
    repository
        .staff_member(id)?
        .filter(StaffMember::is_manager)
        .ok_or_else(|| SchedulingError::not_found(EntityKind::Manager, id))
}

pub(crate) fn require_shift<R>(repository: &R, id: &ShiftId) -> Result<Shift, SchedulingError>
where
    R: SchedulingRepository + ?Sized,
{
    repository
        .shift(id)?
        .ok_or_else(|| SchedulingError::not_found(EntityKind::Shift, id))
}

pub(crate) fn require_vacation<R>(
    repository: &R,
    id: &VacationRequestId,
) -> Result<VacationRequest, SchedulingError>
where
    R: SchedulingRepository + ?Sized,
{
    repository
        .vacation(id)?
        .ok_or_else(|| SchedulingError::not_found(EntityKind::VacationRequest, id))
}
