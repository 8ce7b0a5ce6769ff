use alumnet_application::UserRecord;
use alumnet_core::UserIdentity;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for the one-time administrator bootstrap.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-bootstrap-request.ts"
)]
pub struct AuthBootstrapRequest {
    pub token: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// Incoming payload for self-registration.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-register-request.ts"
)]
pub struct AuthRegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: String,
    pub department: Option<String>,
    pub branch: Option<String>,
}

/// Incoming payload for email/password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-login-request.ts"
)]
pub struct AuthLoginRequest {
    pub email: String,
    pub password: String,
}

/// Login outcome: `authenticated`, `pending_approval` or `rejected`.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-login-response.ts"
)]
pub struct AuthLoginResponse {
    pub status: String,
}

/// API representation of the authenticated user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-identity-response.ts"
)]
pub struct UserIdentityResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub department: Option<String>,
    pub branch: Option<String>,
}

impl UserIdentityResponse {
    /// Combines the session identity with the account's current scope.
    #[must_use]
    pub fn from_identity(identity: &UserIdentity, user: &UserRecord) -> Self {
        Self {
            user_id: identity.user_id().to_string(),
            display_name: user.display_name.clone(),
            email: identity.email().to_owned(),
            role: user.role.as_str().to_owned(),
            department: user.department.clone(),
            branch: user.branch.clone(),
        }
    }
}
