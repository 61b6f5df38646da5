//! Shift assignment and vacation review rules.
//!
//! The record store and the notification sender are reached through
//! [`SchedulingRepository`] and [`NotificationSender`] so the rules can run against the
//! in-memory adapters here or a database-backed store elsewhere.

pub mod assignment;
pub mod domain;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod team;
pub mod vacation;

#[cfg(test)]
mod tests;

pub use assignment::{AssignmentViolation, ClearedAssignment, ShiftAssignmentValidator};
pub use domain::{
    AssignmentId, AssignmentStatus, EmployeeId, EmployeeShift, PersonDetails, ScheduledShift,
    Shift, ShiftDraft, ShiftId, ShiftViolation, StaffMember, StaffRole, VacationRequest,
    VacationRequestId, VacationStatus,
};
pub use memory::{InMemorySchedulingRepository, RecordingNotifier, SentNotification};
pub use repository::{
    NotificationError, NotificationSender, RepositoryError, SchedulingRepository,
};
pub use router::scheduling_router;
pub use service::{EntityKind, SchedulingError, SchedulingService};
pub use team::{team_members, TeamView};
pub use vacation::{
    ApprovalOutcome, VacationApprovalArbiter, VacationOverlapPolicy, VacationViolation,
};
