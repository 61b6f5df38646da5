use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{EmployeeId, StaffMember, VacationRequest, VacationRequestId, VacationStatus};
use super::repository::SchedulingRepository;
use super::service::SchedulingError;

/// What to do when an approval would overlap a vacation the employee already has approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VacationOverlapPolicy {
    /// Approve anyway and report the overlapping requests.
    #[default]
    Record,
    /// Refuse the approval.
    Reject,
}

impl VacationOverlapPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "record" | "allow" => Some(Self::Record),
            "reject" | "deny" => Some(Self::Reject),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::Reject => "reject",
        }
    }
}

/// Business-rule failures raised by vacation request transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VacationViolation {
    #[error("vacation must end on or after its start date")]
    InvalidDateRange,
    #[error("vacation request {request_id} is {status}, only pending requests can be reviewed")]
    NotPending {
        request_id: VacationRequestId,
        status: VacationStatus,
    },
    #[error(
        "vacation request {request_id} overlaps approved vacation(s): {}",
        join_ids(.overlapping)
    )]
    OverlapsApprovedVacation {
        request_id: VacationRequestId,
        overlapping: Vec<VacationRequestId>,
    },
    #[error("employee {employee_id} did not file vacation request {request_id}")]
    NotRequestOwner {
        employee_id: EmployeeId,
        request_id: VacationRequestId,
    },
}

impl VacationViolation {
    pub fn is_authorization(&self) -> bool {
        matches!(self, VacationViolation::NotRequestOwner { .. })
    }
}

fn join_ids(ids: &[VacationRequestId]) -> String {
    ids.iter()
        .map(|id| id.0.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Approved request plus whatever the overlap check turned up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovalOutcome {
    pub request: VacationRequest,
    pub overlapping_approved: Vec<VacationRequestId>,
}

/// Decides whether a pending vacation request may be approved or rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct VacationApprovalArbiter {
    policy: VacationOverlapPolicy,
}

impl VacationApprovalArbiter {
    pub fn new(policy: VacationOverlapPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> VacationOverlapPolicy {
        self.policy
    }

    /// Moves `request` to approved, applying the overlap policy first. Nothing is persisted.
    pub fn approve<R>(
        &self,
        repository: &R,
        mut request: VacationRequest,
        reviewer: &StaffMember,
        comments: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ApprovalOutcome, SchedulingError>
    where
        R: SchedulingRepository + ?Sized,
    {
        ensure_pending(&request)?;

        let overlapping_approved: Vec<VacationRequestId> = repository
            .approved_vacations_overlapping(
                &request.employee_id,
                request.start_date,
                request.end_date,
            )?
            .into_iter()
            .filter(|existing| existing.id != request.id)
            .map(|existing| existing.id)
            .collect();

        if !overlapping_approved.is_empty() {
            match self.policy {
                VacationOverlapPolicy::Reject => {
                    return Err(VacationViolation::OverlapsApprovedVacation {
                        request_id: request.id,
                        overlapping: overlapping_approved,
                    }
                    .into());
                }
                VacationOverlapPolicy::Record => {
                    warn!(
                        request_id = %request.id,
                        employee_id = %request.employee_id,
                        overlapping = overlapping_approved.len(),
                        "approving vacation that overlaps already approved time off"
                    );
                }
            }
        }

        close_review(
            &mut request,
            VacationStatus::Approved,
            reviewer,
            comments,
            now,
        );

        Ok(ApprovalOutcome {
            request,
            overlapping_approved,
        })
    }

    pub fn reject(
        &self,
        mut request: VacationRequest,
        reviewer: &StaffMember,
        comments: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<VacationRequest, SchedulingError> {
        ensure_pending(&request)?;
        close_review(
            &mut request,
            VacationStatus::Rejected,
            reviewer,
            comments,
            now,
        );
        Ok(request)
    }

    /// Withdraws a pending request on behalf of the employee who filed it.
    pub fn cancel(
        &self,
        mut request: VacationRequest,
        employee_id: &EmployeeId,
    ) -> Result<VacationRequest, SchedulingError> {
        if &request.employee_id != employee_id {
            return Err(VacationViolation::NotRequestOwner {
                employee_id: employee_id.clone(),
                request_id: request.id,
            }
            .into());
        }
        ensure_pending(&request)?;
        request.status = VacationStatus::Cancelled;
        Ok(request)
    }
}

fn ensure_pending(request: &VacationRequest) -> Result<(), VacationViolation> {
    if request.status.is_terminal() {
        return Err(VacationViolation::NotPending {
            request_id: request.id.clone(),
            status: request.status,
        });
    }
    Ok(())
}

fn close_review(
    request: &mut VacationRequest,
    status: VacationStatus,
    reviewer: &StaffMember,
    comments: Option<String>,
    now: DateTime<Utc>,
) {
    request.status = status;
    request.reviewed_by = Some(reviewer.id.clone());
    request.reviewed_at = Some(now);
    request.review_notes = comments;
}
