use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for staff members. Managers share the same id space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShiftId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssignmentId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VacationRequestId(pub String);

macro_rules! display_id {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )*
    };
}

display_id!(EmployeeId, ShiftId, AssignmentId, VacationRequestId);

/// Contact details shared by every kind of staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl PersonDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Discriminates plain employees from managers who may assign shifts and review requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    Employee,
    Manager,
}

/// An employee or manager. A manager may itself report to another manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: EmployeeId,
    pub person: PersonDetails,
    pub department: String,
    #[serde(default)]
    pub manager_id: Option<EmployeeId>,
    pub role: StaffRole,
}

impl StaffMember {
    pub fn is_manager(&self) -> bool {
        self.role == StaffRole::Manager
    }

    pub fn reports_to(&self, manager_id: &EmployeeId) -> bool {
        self.manager_id.as_ref() == Some(manager_id)
    }
}

/// A scheduled block of work on a single calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub shift_type_id: Option<String>,
    pub created_by: EmployeeId,
}

impl Shift {
    /// Windows are half-open, so a shift ending at 12:00 does not collide with one
    /// starting at 12:00.
    pub fn overlaps_window(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
        self.date == date && self.start_time < end && start < self.end_time
    }

    pub fn overlaps(&self, other: &Shift) -> bool {
        self.overlaps_window(other.date, other.start_time, other.end_time)
    }

    pub fn has_valid_window(&self) -> bool {
        self.end_time > self.start_time
    }
}

/// Shift records that cannot be stored as given.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShiftViolation {
    #[error("shift on {date} must end after it starts ({start} to {end})")]
    InvalidWindow {
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    },
}

/// Fields a manager supplies when creating a shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDraft {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub shift_type_id: Option<String>,
}

/// Assignments are created as `Assigned`. Completion and cancellation are recorded by
/// whatever owns time tracking, through the record store; only their effect on
/// scheduling is decided here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Assigned,
    Completed,
    Cancelled,
}

impl AssignmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AssignmentStatus::Assigned => "ASSIGNED",
            AssignmentStatus::Completed => "COMPLETED",
            AssignmentStatus::Cancelled => "CANCELLED",
        }
    }

    pub const fn blocks_schedule(self) -> bool {
        !matches!(self, AssignmentStatus::Cancelled)
    }
}

/// Link between one employee and one shift, created by a manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeShift {
    pub id: AssignmentId,
    pub employee_id: EmployeeId,
    pub shift_id: ShiftId,
    pub assigned_by: EmployeeId,
    pub assigned_at: DateTime<Utc>,
    pub status: AssignmentStatus,
}

/// Assignment joined with its shift, as returned for an employee's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledShift {
    pub assignment: EmployeeShift,
    pub shift: Shift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VacationStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl VacationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            VacationStatus::Pending => "PENDING",
            VacationStatus::Approved => "APPROVED",
            VacationStatus::Rejected => "REJECTED",
            VacationStatus::Cancelled => "CANCELLED",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, VacationStatus::Pending)
    }
}

impl fmt::Display for VacationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Time-off request. Created pending and moved to a terminal status exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationRequest {
    pub id: VacationRequestId,
    pub employee_id: EmployeeId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
    pub status: VacationStatus,
    pub requested_at: DateTime<Utc>,
    #[serde(default)]
    pub reviewed_by: Option<EmployeeId>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub review_notes: Option<String>,
}

impl VacationRequest {
    /// Inclusive on both ends: a request ending on the 10th overlaps one starting on the 10th.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }

    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}
