//! User management ports and application service.
//!
//! Owns account lifecycle: registration, bootstrap of the first
//! administrator, authentication, actor resolution for requests, and the
//! scoped user directory.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use alumnet_core::{AppError, AppResult, PageRequest, UserIdentity};
use alumnet_domain::{
    Actor, ApprovalRecord, ApprovalStatus, AuditAction, ContentScope, Role, UserId, ViewFilter,
    scope::normalize_scope_value,
};

use crate::{AuditEvent, AuditRepository};

mod login;
mod registration;
mod retrieval;

pub use retrieval::ScopeClaimCheck;


// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// User record returned by repository queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Unique user identifier.
    pub id: UserId,
    /// Canonical email address.
    pub email: String,
    /// Name shown to other members.
    pub display_name: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Account role.
    pub role: Role,
    /// Department, if set.
    pub department: Option<String>,
    /// Branch, if set.
    pub branch: Option<String>,
    /// State of the account's approval record.
    pub approval_status: ApprovalStatus,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Returns the request actor for this account.
    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor::new(
            self.id,
            self.role,
            self.department.clone(),
            self.branch.clone(),
        )
    }

    /// Returns the scope used when the account itself is listed.
    #[must_use]
    pub fn listing_scope(&self) -> ContentScope {
        ContentScope {
            department: self.department.clone(),
            branch: self.branch.clone(),
            target_audience: None,
            visibility: None,
            created_by: Some(self.id),
        }
        .normalized()
    }
}

/// Insert payload for a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    /// Identifier assigned by the service.
    pub id: UserId,
    /// Canonical email address.
    pub email: String,
    /// Name shown to other members.
    pub display_name: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Account role.
    pub role: Role,
    /// Department, if set.
    pub department: Option<String>,
    /// Branch, if set.
    pub branch: Option<String>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Raw department and branch values stored on accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeValues {
    /// Stored departments, possibly repeated.
    pub departments: Vec<String>,
    /// Stored branches, possibly repeated.
    pub branches: Vec<String>,
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;

    /// Finds a user by their unique identifier.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Creates the account together with its approval record.
    async fn create(&self, user: NewUserRecord, approval: ApprovalRecord) -> AppResult<()>;

    /// Returns whether any administrator account exists.
    async fn admin_exists(&self) -> AppResult<bool>;

    /// Lists approved accounts whose department/branch pass `filter`.
    async fn list(
        &self,
        filter: &ViewFilter,
        role: Option<Role>,
        page: PageRequest,
    ) -> AppResult<Vec<UserRecord>>;

    /// Replaces role, department and branch of an account and its approval
    /// record.
    async fn update_scope(
        &self,
        user_id: UserId,
        role: Role,
        department: Option<String>,
        branch: Option<String>,
    ) -> AppResult<()>;

    /// Returns every non-null department and branch stored on accounts.
    async fn scope_values(&self) -> AppResult<ScopeValues>;
}

/// Port for password hashing operations. Keeps domain/application free of
/// direct cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password using Argon2id.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    /// Must run in constant time regardless of validity.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

// ---------------------------------------------------------------------------
// Authentication outcome
// ---------------------------------------------------------------------------

/// Result of a login attempt.
#[derive(Debug)]
pub enum AuthOutcome {
    /// Authentication succeeded. Session can be established.
    Authenticated(UserRecord),
    /// Credentials were valid but the account awaits approval.
    PendingApproval,
    /// Credentials were valid but the account was rejected.
    Rejected,
    /// Authentication failed. Generic message prevents enumeration.
    Failed,
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Parameters for self-registration.
#[derive(Debug, Clone)]
pub struct RegisterParams {
    /// Email address for the new account.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Name shown to other members.
    pub display_name: String,
    /// Requested role. Administrators cannot self-register.
    pub role: Role,
    /// Department claim.
    pub department: Option<String>,
    /// Branch claim.
    pub branch: Option<String>,
}

/// Parameters for creating the first administrator.
#[derive(Debug, Clone)]
pub struct BootstrapAdminParams {
    /// Email address for the administrator.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Name shown to other members.
    pub display_name: String,
}

/// Filters for the user directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserListQuery {
    /// Only list accounts with this role.
    pub role: Option<Role>,
    /// Page window.
    pub page: PageRequest,
}

/// Administrator edit of an account's role and scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUserScope {
    /// New role.
    pub role: Role,
    /// New department.
    pub department: Option<String>,
    /// New branch.
    pub branch: Option<String>,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service for accounts and authentication.
#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
            audit_repository,
        }
    }

    /// Resolves the actor behind an authenticated session.
    ///
    /// Role, department and branch are read from the store on every call so
    /// administrator edits apply to live sessions.
    pub async fn resolve_actor(&self, identity: &UserIdentity) -> AppResult<Actor> {
        let user = self
            .user_repository
            .find_by_id(UserId::from_uuid(identity.user_id()))
            .await?
            .ok_or_else(|| AppError::Unauthorized("session account no longer exists".to_owned()))?;

        if user.approval_status != ApprovalStatus::Approved {
            return Err(AppError::Forbidden(format!(
                "account '{}' is {}",
                user.id,
                user.approval_status.as_str()
            )));
        }

        Ok(user.actor())
    }

    async fn audit(
        &self,
        actor: &Actor,
        action: AuditAction,
        user_id: UserId,
        detail: Option<String>,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.id(),
                action,
                resource_type: "user".to_owned(),
                resource_id: user_id.to_string(),
                detail,
            })
            .await
    }
}

/// Validates and normalizes the department/branch a role must carry.
fn require_scope_for_role(
    role: Role,
    department: Option<String>,
    branch: Option<String>,
) -> AppResult<(Option<String>, Option<String>)> {
    let department = normalize_scope_value(department);
    let branch = normalize_scope_value(branch);

    if role.requires_department() && department.is_none() {
        return Err(AppError::Validation(format!(
            "department is required for {role} accounts"
        )));
    }
    if role.requires_branch() && branch.is_none() {
        return Err(AppError::Validation(format!(
            "branch is required for {role} accounts"
        )));
    }

    Ok((department, branch))
}
