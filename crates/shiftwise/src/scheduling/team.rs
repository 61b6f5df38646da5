use serde::Serialize;

use super::domain::{EmployeeId, StaffMember, StaffRole};
use super::repository::SchedulingRepository;
use super::service::{require_manager, SchedulingError};

/// Staff members reporting directly to `manager_id`.
pub fn team_members<R>(
    repository: &R,
    manager_id: &EmployeeId,
) -> Result<Vec<StaffMember>, SchedulingError>
where
    R: SchedulingRepository + ?Sized,
{
    let manager = require_manager(repository, manager_id)?;
    Ok(repository.team_of(&manager.id)?)
}

/// Condensed team listing for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct TeamView {
    pub manager_id: EmployeeId,
    pub members: Vec<TeamMemberView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamMemberView {
    pub id: EmployeeId,
    pub name: String,
    pub department: String,
    pub role: StaffRole,
}

impl TeamView {
    pub fn new(manager_id: EmployeeId, members: &[StaffMember]) -> Self {
        Self {
            manager_id,
            members: members
                .iter()
                .map(|member| TeamMemberView {
                    id: member.id.clone(),
                    name: member.person.full_name(),
                    department: member.department.clone(),
                    role: member.role,
                })
                .collect(),
        }
    }
}
