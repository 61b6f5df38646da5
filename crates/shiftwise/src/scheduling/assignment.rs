use chrono::{DateTime, Utc};

use super::domain::{
    AssignmentId, AssignmentStatus, EmployeeId, EmployeeShift, Shift, ShiftId, StaffMember,
};
use super::repository::SchedulingRepository;
use super::service::{require_manager, require_shift, require_staff, SchedulingError};

/// Business-rule failures raised while assigning an employee to a shift.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentViolation {
    #[error("manager {manager_id} is not authorized to assign shifts to employee {employee_id}")]
    ManagerNotAuthorized {
        manager_id: EmployeeId,
        employee_id: EmployeeId,
    },
    #[error("employee {employee_id} is already assigned to shift {shift_id}")]
    AlreadyAssigned {
        employee_id: EmployeeId,
        shift_id: ShiftId,
    },
    #[error("employee {employee_id} has a conflicting shift {conflicting_shift_id}")]
    ConflictingShift {
        employee_id: EmployeeId,
        conflicting_shift_id: ShiftId,
    },
}

impl AssignmentViolation {
    pub fn is_authorization(&self) -> bool {
        matches!(self, AssignmentViolation::ManagerNotAuthorized { .. })
    }
}

/// Records that passed every gate and are ready to be linked.
#[derive(Debug, Clone)]
pub struct ClearedAssignment {
    pub manager: StaffMember,
    pub employee: StaffMember,
    pub shift: Shift,
}

impl ClearedAssignment {
    pub fn into_assignment(self, id: AssignmentId, assigned_at: DateTime<Utc>) -> EmployeeShift {
        EmployeeShift {
            id,
            employee_id: self.employee.id,
            shift_id: self.shift.id,
            assigned_by: self.manager.id,
            assigned_at,
            status: AssignmentStatus::Assigned,
        }
    }
}

/// Sequential gate deciding whether a manager may put an employee on a shift.
///
/// Gates run in a fixed order and the first failure is returned: lookups, manager
/// authorization, duplicate assignment, then time overlap on the same date.
pub struct ShiftAssignmentValidator<'a, R: ?Sized> {
    repository: &'a R,
}

impl<'a, R> ShiftAssignmentValidator<'a, R>
where
    R: SchedulingRepository + ?Sized,
{
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    pub fn validate(
        &self,
        shift_id: &ShiftId,
        employee_id: &EmployeeId,
        manager_id: &EmployeeId,
    ) -> Result<ClearedAssignment, SchedulingError> {
        let manager = require_manager(self.repository, manager_id)?;
        let employee = require_staff(self.repository, employee_id)?;
        let shift = require_shift(self.repository, shift_id)?;

        if !employee.reports_to(&manager.id) {
            return Err(AssignmentViolation::ManagerNotAuthorized {
                manager_id: manager.id,
                employee_id: employee.id,
            }
            .into());
        }

        if self.repository.assignment(&employee.id, &shift.id)?.is_some() {
            return Err(AssignmentViolation::AlreadyAssigned {
                employee_id: employee.id,
                shift_id: shift.id,
            }
            .into());
        }

        let conflicts = self.repository.overlapping_assignments(
            &employee.id,
            shift.date,
            shift.start_time,
            shift.end_time,
        )?;
        if let Some(conflict) = conflicts.into_iter().next() {
            return Err(AssignmentViolation::ConflictingShift {
                employee_id: employee.id,
                conflicting_shift_id: conflict.shift_id,
            }
            .into());
        }

        Ok(ClearedAssignment {
            manager,
            employee,
            shift,
        })
    }
}
