use tracing::info;

use super::*;

impl PostgresUserRepository {
    pub(super) async fn create_impl(
        &self,
        user: NewUserRecord,
        approval: ApprovalRecord,
    ) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin user creation transaction: {error}"))
        })?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, display_name, password_hash, role, department, branch, created_at)
            VALUES ($1, LOWER($2), $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.display_name.as_str())
        .bind(user.password_hash.as_str())
        .bind(user.role.as_str())
        .bind(user.department.as_deref())
        .bind(user.branch.as_deref())
        .bind(user.created_at)
        .execute(&mut *transaction)
        .await
        .map_err(|error| email_conflict_or_internal(error, "create user"))?;

        sqlx::query(
            r#"
            INSERT INTO approval_records (user_id, role, department, branch, status, approved_by, resolved_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(approval.user_id().as_uuid())
        .bind(approval.role().as_str())
        .bind(approval.department())
        .bind(approval.branch())
        .bind(approval.status().as_str())
        .bind(approval.approved_by().map(|id| id.as_uuid()))
        .bind(approval.resolved_at())
        .bind(approval.created_at())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to create approval record: {error}"))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit user creation: {error}"))
        })?;

        info!(user_id = %user.id, role = %user.role, "account created");
        Ok(())
    }

    pub(super) async fn update_scope_impl(
        &self,
        user_id: UserId,
        role: Role,
        department: Option<String>,
        branch: Option<String>,
    ) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin scope update transaction: {error}"))
        })?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET role = $2, department = $3, branch = $4, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role.as_str())
        .bind(department.as_deref())
        .bind(branch.as_deref())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update user scope: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user '{user_id}' not found")));
        }

        sqlx::query(
            r#"
            UPDATE approval_records
            SET role = $2, department = $3, branch = $4
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role.as_str())
        .bind(department.as_deref())
        .bind(branch.as_deref())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to update approval record scope: {error}"))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit scope update: {error}"))
        })?;

        Ok(())
    }
}
