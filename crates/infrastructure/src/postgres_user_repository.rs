//! PostgreSQL-backed user repository.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;

use alumnet_application::{NewUserRecord, ScopeValues, UserRecord, UserRepository};
use alumnet_core::{AppError, AppResult, PageRequest};
use alumnet_domain::{ApprovalRecord, ApprovalStatus, Role, UserId, ViewFilter};

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = r#"
    users.id,
    users.email,
    users.display_name,
    users.password_hash,
    users.role,
    users.department,
    users.branch,
    COALESCE(approval_records.status, 'pending') AS approval_status,
    users.created_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    email: String,
    display_name: String,
    password_hash: String,
    role: String,
    department: Option<String>,
    branch: Option<String>,
    approval_status: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(row.role.as_str()).map_err(|error| {
            AppError::Internal(format!("persisted role for user '{}' is invalid: {error}", row.id))
        })?;
        let approval_status =
            ApprovalStatus::from_str(row.approval_status.as_str()).map_err(|error| {
                AppError::Internal(format!(
                    "persisted approval status for user '{}' is invalid: {error}",
                    row.id
                ))
            })?;

        Ok(Self {
            id: UserId::from_uuid(row.id),
            email: row.email,
            display_name: row.display_name,
            password_hash: row.password_hash,
            role,
            department: row.department,
            branch: row.branch,
            approval_status,
            created_at: row.created_at,
        })
    }
}

mod account;
mod lookup;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        self.find_by_email_impl(email).await
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        self.find_by_id_impl(user_id).await
    }

    async fn create(&self, user: NewUserRecord, approval: ApprovalRecord) -> AppResult<()> {
        self.create_impl(user, approval).await
    }

    async fn admin_exists(&self) -> AppResult<bool> {
        self.admin_exists_impl().await
    }

    async fn list(
        &self,
        filter: &ViewFilter,
        role: Option<Role>,
        page: PageRequest,
    ) -> AppResult<Vec<UserRecord>> {
        self.list_impl(filter, role, page).await
    }

    async fn update_scope(
        &self,
        user_id: UserId,
        role: Role,
        department: Option<String>,
        branch: Option<String>,
    ) -> AppResult<()> {
        self.update_scope_impl(user_id, role, department, branch)
            .await
    }

    async fn scope_values(&self) -> AppResult<ScopeValues> {
        self.scope_values_impl().await
    }
}

fn email_conflict_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict("an account with this email already exists".to_owned());
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}
