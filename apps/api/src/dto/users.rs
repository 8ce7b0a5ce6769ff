use std::str::FromStr;

use alumnet_application::{ScopeClaimCheck, UpdateUserScope, UserListQuery, UserRecord};
use alumnet_core::AppResult;
use alumnet_domain::{Role, ScopeDirectory};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::PageParams;

/// Query parameters for the user directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListParams {
    pub role: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl UserListParams {
    pub fn into_query(self) -> AppResult<UserListQuery> {
        Ok(UserListQuery {
            role: self
                .role
                .as_deref()
                .filter(|value| !value.trim().is_empty())
                .map(Role::from_str)
                .transpose()?,
            page: PageParams {
                limit: self.limit,
                offset: self.offset,
            }
            .into_page()?,
        })
    }
}

/// API representation of an account. Never carries the password hash.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub department: Option<String>,
    pub branch: Option<String>,
    pub approval_status: String,
    pub created_at: String,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            display_name: user.display_name,
            role: user.role.as_str().to_owned(),
            department: user.department,
            branch: user.branch,
            approval_status: user.approval_status.as_str().to_owned(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Incoming payload for an administrator scope change.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-user-scope-request.ts"
)]
pub struct UpdateUserScopeRequest {
    pub role: String,
    pub department: Option<String>,
    pub branch: Option<String>,
}

impl UpdateUserScopeRequest {
    pub fn into_update(self) -> AppResult<UpdateUserScope> {
        Ok(UpdateUserScope {
            role: Role::from_str(self.role.as_str())?,
            department: self.department,
            branch: self.branch,
        })
    }
}

/// Departments and branches in use.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/directory-response.ts"
)]
pub struct DirectoryResponse {
    pub departments: Vec<String>,
    pub branches: Vec<String>,
}

impl From<ScopeDirectory> for DirectoryResponse {
    fn from(directory: ScopeDirectory) -> Self {
        Self {
            departments: directory.departments().to_vec(),
            branches: directory.branches().to_vec(),
        }
    }
}

/// Query parameters for checking a claimed department/branch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopeClaimParams {
    pub department: Option<String>,
    pub branch: Option<String>,
}

/// Whether claimed values already exist in the directory.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/scope-claim-response.ts"
)]
pub struct ScopeClaimResponse {
    pub department_known: bool,
    pub branch_known: bool,
}

impl From<ScopeClaimCheck> for ScopeClaimResponse {
    fn from(check: ScopeClaimCheck) -> Self {
        Self {
            department_known: check.department_known,
            branch_known: check.branch_known,
        }
    }
}
