use sqlx::{Postgres, QueryBuilder};

use crate::view_filter_sql::{ScopeColumns, push_view_filter};

use super::*;

const ACCOUNT_SCOPE: ScopeColumns = ScopeColumns {
    department: "users.department",
    branch: "users.branch",
    target_audience: None,
    visibility: None,
};

impl PostgresUserRepository {
    pub(super) async fn find_by_email_impl(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            LEFT JOIN approval_records ON approval_records.user_id = users.id
            WHERE LOWER(users.email) = LOWER($1)
            "#
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by email: {error}")))?;

        row.map(UserRecord::try_from).transpose()
    }

    pub(super) async fn find_by_id_impl(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            LEFT JOIN approval_records ON approval_records.user_id = users.id
            WHERE users.id = $1
            "#
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by id: {error}")))?;

        row.map(UserRecord::try_from).transpose()
    }

    pub(super) async fn admin_exists_impl(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM users WHERE role = 'admin')
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to check for administrators: {error}")))
    }

    pub(super) async fn list_impl(
        &self,
        filter: &ViewFilter,
        role: Option<Role>,
        page: PageRequest,
    ) -> AppResult<Vec<UserRecord>> {
        let limit = i64::try_from(page.limit()).map_err(|error| {
            AppError::Validation(format!("invalid user listing limit: {error}"))
        })?;
        let offset = i64::try_from(page.offset()).map_err(|error| {
            AppError::Validation(format!("invalid user listing offset: {error}"))
        })?;

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "SELECT {USER_COLUMNS} FROM users \
             JOIN approval_records ON approval_records.user_id = users.id \
             WHERE approval_records.status = 'approved'"
        ));

        if let Some(role) = role {
            builder.push(" AND users.role = ");
            builder.push_bind(role.as_str());
        }

        if !filter.is_unrestricted() {
            builder.push(" AND ");
            push_view_filter(&mut builder, filter, &ACCOUNT_SCOPE);
        }

        builder.push(" ORDER BY users.email LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let rows = builder
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list users: {error}")))?;

        rows.into_iter().map(UserRecord::try_from).collect()
    }

    pub(super) async fn scope_values_impl(&self) -> AppResult<ScopeValues> {
        let departments = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT BTRIM(department, E' \t\n\r\f\013')
            FROM users
            WHERE COALESCE(BTRIM(department, E' \t\n\r\f\013'), '') <> ''
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list departments: {error}")))?;

        let branches = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT BTRIM(branch, E' \t\n\r\f\013')
            FROM users
            WHERE COALESCE(BTRIM(branch, E' \t\n\r\f\013'), '') <> ''
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list branches: {error}")))?;

        Ok(ScopeValues {
            departments,
            branches,
        })
    }
}
