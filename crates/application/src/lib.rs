//! Application services and ports.

#![forbid(unsafe_code)]

mod approval_service;
mod audit_ports;
mod content_service;
mod user_service;

#[cfg(test)]
mod test_support;

pub use approval_service::{ApprovalRepository, ApprovalService};
pub use audit_ports::{AuditEvent, AuditRepository};
pub use content_service::{
    ContentInput, ContentListQuery, ContentRepository, ContentService, ScopeInput,
};
pub use user_service::{
    AuthOutcome, BootstrapAdminParams, NewUserRecord, PasswordHasher, RegisterParams,
    ScopeClaimCheck, ScopeValues, UpdateUserScope, UserListQuery, UserRecord, UserRepository,
    UserService,
};
