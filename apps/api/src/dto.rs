//! Transport types for the HTTP API.
//!
//! Every type derives [`ts_rs::TS`] so the frontend can share them.

mod approvals;
mod auth;
mod common;
mod content;
mod users;

pub use approvals::{ApprovalResponse, BranchManagerGrantResponse};
pub use auth::{
    AuthBootstrapRequest, AuthLoginRequest, AuthLoginResponse, AuthRegisterRequest,
    UserIdentityResponse,
};
pub use common::{GenericMessageResponse, HealthResponse, PageParams};
pub use content::{
    ContentListParams, ContentRequest, ContentResponse, PurgeExpiredResponse,
};
pub use users::{
    DirectoryResponse, ScopeClaimParams, ScopeClaimResponse, UpdateUserScopeRequest,
    UserListParams, UserResponse,
};
