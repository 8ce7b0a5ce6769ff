//! PostgreSQL-backed approval records and branch-manager grants.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use alumnet_application::ApprovalRepository;
use alumnet_core::{AppError, AppResult};
use alumnet_domain::{ApprovalRecord, ApprovalStatus, BranchManagerGrant, Role, UserId, ViewFilter};

use crate::view_filter_sql::{ScopeColumns, push_view_filter};

const APPROVAL_SCOPE: ScopeColumns = ScopeColumns {
    department: "department",
    branch: "branch",
    target_audience: None,
    visibility: None,
};

/// PostgreSQL implementation of the approval repository port.
#[derive(Clone)]
pub struct PostgresApprovalRepository {
    pool: PgPool,
}

impl PostgresApprovalRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ApprovalRow {
    user_id: Uuid,
    role: String,
    department: Option<String>,
    branch: Option<String>,
    status: String,
    approved_by: Option<Uuid>,
    resolved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ApprovalRow> for ApprovalRecord {
    type Error = AppError;

    fn try_from(row: ApprovalRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(row.role.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "persisted approval role for user '{}' is invalid: {error}",
                row.user_id
            ))
        })?;
        let status = ApprovalStatus::from_str(row.status.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "persisted approval status for user '{}' is invalid: {error}",
                row.user_id
            ))
        })?;

        Ok(ApprovalRecord::restore(
            UserId::from_uuid(row.user_id),
            role,
            row.department,
            row.branch,
            status,
            row.approved_by.map(UserId::from_uuid),
            row.resolved_at,
            row.created_at,
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GrantRow {
    professor_id: Uuid,
    is_branch_manager: bool,
    can_approve_students: bool,
    granted_by: Option<Uuid>,
    updated_at: DateTime<Utc>,
}

impl From<GrantRow> for BranchManagerGrant {
    fn from(row: GrantRow) -> Self {
        BranchManagerGrant::restore(
            UserId::from_uuid(row.professor_id),
            row.is_branch_manager,
            row.can_approve_students,
            row.granted_by.map(UserId::from_uuid),
            row.updated_at,
        )
    }
}

#[async_trait]
impl ApprovalRepository for PostgresApprovalRepository {
    async fn find_record(&self, user_id: UserId) -> AppResult<Option<ApprovalRecord>> {
        let row = sqlx::query_as::<_, ApprovalRow>(
            r#"
            SELECT user_id, role, department, branch, status, approved_by, resolved_at, created_at
            FROM approval_records
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find approval record: {error}")))?;

        row.map(ApprovalRecord::try_from).transpose()
    }

    async fn list_pending(&self, filter: &ViewFilter) -> AppResult<Vec<ApprovalRecord>> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT user_id, role, department, branch, status, approved_by, resolved_at, created_at \
             FROM approval_records WHERE status = 'pending'",
        );

        if !filter.is_unrestricted() {
            builder.push(" AND ");
            push_view_filter(&mut builder, filter, &APPROVAL_SCOPE);
        }

        builder.push(" ORDER BY created_at");

        let rows = builder
            .build_query_as::<ApprovalRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to list pending approvals: {error}"))
            })?;

        rows.into_iter().map(ApprovalRecord::try_from).collect()
    }

    async fn save_record(&self, record: &ApprovalRecord) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE approval_records
            SET status = $2, approved_by = $3, resolved_at = $4
            WHERE user_id = $1
            "#,
        )
        .bind(record.user_id().as_uuid())
        .bind(record.status().as_str())
        .bind(record.approved_by().map(|id| id.as_uuid()))
        .bind(record.resolved_at())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save approval record: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "approval record for user '{}' not found",
                record.user_id()
            )));
        }

        debug!(
            user_id = %record.user_id(),
            status = record.status().as_str(),
            "approval record saved"
        );
        Ok(())
    }

    async fn find_grant(&self, professor: UserId) -> AppResult<Option<BranchManagerGrant>> {
        let row = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT professor_id, is_branch_manager, can_approve_students, granted_by, updated_at
            FROM branch_manager_grants
            WHERE professor_id = $1
            "#,
        )
        .bind(professor.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find branch manager grant: {error}"))
        })?;

        Ok(row.map(BranchManagerGrant::from))
    }

    async fn save_grant(&self, grant: &BranchManagerGrant) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO branch_manager_grants (
                professor_id,
                is_branch_manager,
                can_approve_students,
                granted_by,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (professor_id) DO UPDATE
            SET is_branch_manager = EXCLUDED.is_branch_manager,
                can_approve_students = EXCLUDED.can_approve_students,
                granted_by = EXCLUDED.granted_by,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(grant.professor().as_uuid())
        .bind(grant.is_branch_manager())
        .bind(grant.can_approve_students())
        .bind(grant.granted_by().map(|id| id.as_uuid()))
        .bind(grant.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to save branch manager grant: {error}"))
        })?;

        Ok(())
    }
}
