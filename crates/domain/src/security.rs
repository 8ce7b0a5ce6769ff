use std::str::FromStr;

use alumnet_core::AppError;
use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a pending account is approved.
    ApprovalApproved,
    /// Emitted when a pending account is rejected.
    ApprovalRejected,
    /// Emitted when a professor becomes branch manager.
    BranchManagerAssigned,
    /// Emitted when a professor stops being branch manager.
    BranchManagerRemoved,
    /// Emitted when an administrator edits an account's role or scope.
    UserScopeUpdated,
    /// Emitted when expired content is purged.
    ContentPurged,
    /// Emitted when the first administrator is bootstrapped.
    AdminBootstrapped,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApprovalApproved => "approval.approved",
            Self::ApprovalRejected => "approval.rejected",
            Self::BranchManagerAssigned => "branch_manager.assigned",
            Self::BranchManagerRemoved => "branch_manager.removed",
            Self::UserScopeUpdated => "user.scope.updated",
            Self::ContentPurged => "content.purged",
            Self::AdminBootstrapped => "admin.bootstrapped",
        }
    }
}

impl FromStr for AuditAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "approval.approved" => Ok(Self::ApprovalApproved),
            "approval.rejected" => Ok(Self::ApprovalRejected),
            "branch_manager.assigned" => Ok(Self::BranchManagerAssigned),
            "branch_manager.removed" => Ok(Self::BranchManagerRemoved),
            "user.scope.updated" => Ok(Self::UserScopeUpdated),
            "content.purged" => Ok(Self::ContentPurged),
            "admin.bootstrapped" => Ok(Self::AdminBootstrapped),
            _ => Err(AppError::Validation(format!(
                "unknown audit action '{value}'"
            ))),
        }
    }
}
