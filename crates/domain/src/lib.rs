//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod actor;
mod approval;
mod content;
mod directory;
mod role;
pub mod scope;
mod security;
mod user;
mod view_filter;
mod visibility;

pub use actor::Actor;
pub use approval::{
    ApprovalDecision, ApprovalRecord, ApprovalStatus, BranchManagerGrant, can_approve,
    can_manage_branch_manager, has_approval_authority,
};
pub use content::{
    ContentBody, ContentClass, ContentId, ContentItem, ContentScope, PostVisibility,
};
pub use directory::ScopeDirectory;
pub use role::Role;
pub use security::AuditAction;
pub use user::{
    EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, UserId, validate_password,
};
pub use view_filter::{ScopeClause, ViewFilter};
pub use visibility::{build_view_filter, can_mutate, can_view};
