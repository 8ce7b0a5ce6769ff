use alumnet_domain::{ApprovalRecord, BranchManagerGrant};
use serde::Serialize;
use ts_rs::TS;

/// API representation of an approval record.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/approval-response.ts"
)]
pub struct ApprovalResponse {
    pub user_id: String,
    pub role: String,
    pub department: Option<String>,
    pub branch: Option<String>,
    pub status: String,
    pub approved_by: Option<String>,
    pub resolved_at: Option<String>,
    pub created_at: String,
}

impl From<ApprovalRecord> for ApprovalResponse {
    fn from(record: ApprovalRecord) -> Self {
        Self {
            user_id: record.user_id().to_string(),
            role: record.role().as_str().to_owned(),
            department: record.department().map(ToOwned::to_owned),
            branch: record.branch().map(ToOwned::to_owned),
            status: record.status().as_str().to_owned(),
            approved_by: record.approved_by().map(|user_id| user_id.to_string()),
            resolved_at: record.resolved_at().map(|at| at.to_rfc3339()),
            created_at: record.created_at().to_rfc3339(),
        }
    }
}

/// API representation of a professor's branch-manager flags.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/branch-manager-grant-response.ts"
)]
pub struct BranchManagerGrantResponse {
    pub professor_id: String,
    pub is_branch_manager: bool,
    pub can_approve_students: bool,
    pub granted_by: Option<String>,
    pub updated_at: String,
}

impl From<BranchManagerGrant> for BranchManagerGrantResponse {
    fn from(grant: BranchManagerGrant) -> Self {
        Self {
            professor_id: grant.professor().to_string(),
            is_branch_manager: grant.is_branch_manager(),
            can_approve_students: grant.can_approve_students(),
            granted_by: grant.granted_by().map(|user_id| user_id.to_string()),
            updated_at: grant.updated_at().to_rfc3339(),
        }
    }
}
