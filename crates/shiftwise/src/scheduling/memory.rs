use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use super::domain::{
    EmployeeId, EmployeeShift, Shift, ShiftId, StaffMember, VacationRequest, VacationRequestId,
    VacationStatus,
};
use super::repository::{
    NotificationError, NotificationSender, RepositoryError, SchedulingRepository,
};

#[derive(Default)]
struct Tables {
    staff: HashMap<EmployeeId, StaffMember>,
    shifts: HashMap<ShiftId, Shift>,
    assignments: HashMap<(EmployeeId, ShiftId), EmployeeShift>,
    vacations: HashMap<VacationRequestId, VacationRequest>,
}

/// Process-local store backing the API server, the demo, and tests.
#[derive(Default, Clone)]
pub struct InMemorySchedulingRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemorySchedulingRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }

    pub fn assignment_count(&self) -> usize {
        self.lock().map(|tables| tables.assignments.len()).unwrap_or(0)
    }
}

impl SchedulingRepository for InMemorySchedulingRepository {
    fn staff_member(&self, id: &EmployeeId) -> Result<Option<StaffMember>, RepositoryError> {
        Ok(self.lock()?.staff.get(id).cloned())
    }

    fn insert_staff_member(&self, member: StaffMember) -> Result<StaffMember, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.staff.contains_key(&member.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.staff.insert(member.id.clone(), member.clone());
        Ok(member)
    }

    fn team_of(&self, manager_id: &EmployeeId) -> Result<Vec<StaffMember>, RepositoryError> {
        let tables = self.lock()?;
        let mut team: Vec<StaffMember> = tables
            .staff
            .values()
            .filter(|member| member.reports_to(manager_id))
            .cloned()
            .collect();
        team.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(team)
    }

    fn shift(&self, id: &ShiftId) -> Result<Option<Shift>, RepositoryError> {
        Ok(self.lock()?.shifts.get(id).cloned())
    }

    fn insert_shift(&self, shift: Shift) -> Result<Shift, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.shifts.contains_key(&shift.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.shifts.insert(shift.id.clone(), shift.clone());
        Ok(shift)
    }

    fn assignment(
        &self,
        employee_id: &EmployeeId,
        shift_id: &ShiftId,
    ) -> Result<Option<EmployeeShift>, RepositoryError> {
        let key = (employee_id.clone(), shift_id.clone());
        Ok(self.lock()?.assignments.get(&key).cloned())
    }

    fn overlapping_assignments(
        &self,
        employee_id: &EmployeeId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Vec<EmployeeShift>, RepositoryError> {
        let tables = self.lock()?;
        let overlapping = tables
            .assignments
            .values()
            .filter(|assignment| {
                &assignment.employee_id == employee_id && assignment.status.blocks_schedule()
            })
            .filter(|assignment| {
                tables
                    .shifts
                    .get(&assignment.shift_id)
                    .map(|shift| shift.overlaps_window(date, start, end))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        Ok(overlapping)
    }

    fn assignments_for(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<EmployeeShift>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .assignments
            .values()
            .filter(|assignment| &assignment.employee_id == employee_id)
            .cloned()
            .collect())
    }

    fn insert_assignment(
        &self,
        assignment: EmployeeShift,
    ) -> Result<EmployeeShift, RepositoryError> {
        let mut tables = self.lock()?;
        let key = (assignment.employee_id.clone(), assignment.shift_id.clone());
        if tables.assignments.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        tables.assignments.insert(key, assignment.clone());
        Ok(assignment)
    }

    fn vacation(&self, id: &VacationRequestId) -> Result<Option<VacationRequest>, RepositoryError> {
        Ok(self.lock()?.vacations.get(id).cloned())
    }

    fn insert_vacation(
        &self,
        request: VacationRequest,
    ) -> Result<VacationRequest, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.vacations.contains_key(&request.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.vacations.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn update_vacation(&self, request: VacationRequest) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        match tables.vacations.get_mut(&request.id) {
            Some(existing) => {
                *existing = request;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn approved_vacations_overlapping(
        &self,
        employee_id: &EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<VacationRequest>, RepositoryError> {
        let tables = self.lock()?;
        let mut overlapping: Vec<VacationRequest> = tables
            .vacations
            .values()
            .filter(|request| {
                &request.employee_id == employee_id
                    && request.status == VacationStatus::Approved
                    && request.overlaps(start, end)
            })
            .cloned()
            .collect();
        overlapping.sort_by_key(|request| request.start_date);
        Ok(overlapping)
    }

    fn vacations_for(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<VacationRequest>, RepositoryError> {
        let tables = self.lock()?;
        let mut requests: Vec<VacationRequest> = tables
            .vacations
            .values()
            .filter(|request| &request.employee_id == employee_id)
            .cloned()
            .collect();
        requests.sort_by_key(|request| request.start_date);
        Ok(requests)
    }
}

/// Notification captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SentNotification {
    ShiftAssigned {
        employee_id: EmployeeId,
        shift_id: ShiftId,
    },
    VacationStatusChanged {
        employee_id: EmployeeId,
        request_id: VacationRequestId,
        approved: bool,
    },
}

/// Notifier that keeps every dispatched message in memory, standing in for a real inbox.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<SentNotification>>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<SentNotification> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    fn record(&self, event: SentNotification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .map_err(|_| NotificationError::Transport("notifier mutex poisoned".to_string()))?
            .push(event);
        Ok(())
    }
}

impl NotificationSender for RecordingNotifier {
    fn shift_assigned(
        &self,
        employee_id: &EmployeeId,
        shift_id: &ShiftId,
    ) -> Result<(), NotificationError> {
        self.record(SentNotification::ShiftAssigned {
            employee_id: employee_id.clone(),
            shift_id: shift_id.clone(),
        })
    }

    fn vacation_status_changed(
        &self,
        employee_id: &EmployeeId,
        request_id: &VacationRequestId,
        approved: bool,
    ) -> Result<(), NotificationError> {
        self.record(SentNotification::VacationStatusChanged {
            employee_id: employee_id.clone(),
            request_id: request_id.clone(),
            approved,
        })
    }
}
