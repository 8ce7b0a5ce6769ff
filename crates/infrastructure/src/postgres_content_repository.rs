//! PostgreSQL-backed content repository.
//!
//! Scope attributes live in plain columns so that visibility filters compile
//! to SQL; the class-specific payload is stored as JSONB.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use alumnet_application::ContentRepository;
use alumnet_core::{AppError, AppResult, PageRequest};
use alumnet_domain::{
    ContentBody, ContentClass, ContentId, ContentItem, ContentScope, PostVisibility, Role, UserId,
    ViewFilter,
};

use crate::view_filter_sql::{ScopeColumns, push_view_filter};

const CONTENT_SCOPE: ScopeColumns = ScopeColumns {
    department: "department",
    branch: "branch",
    target_audience: Some("target_audience"),
    visibility: Some("visibility"),
};

const CONTENT_COLUMNS: &str =
    "id, department, branch, target_audience, visibility, created_by, body, created_at, updated_at";

/// PostgreSQL implementation of the content repository port.
#[derive(Clone)]
pub struct PostgresContentRepository {
    pool: PgPool,
}

impl PostgresContentRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContentRow {
    id: Uuid,
    department: Option<String>,
    branch: Option<String>,
    target_audience: Option<Vec<String>>,
    visibility: Option<String>,
    created_by: Option<Uuid>,
    body: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn content_item_from_row(row: ContentRow) -> AppResult<ContentItem> {
    let content_id = row.id;
    let invalid = |field: &str, error: &dyn std::fmt::Display| {
        AppError::Internal(format!(
            "persisted {field} for content '{content_id}' is invalid: {error}"
        ))
    };

    let target_audience = row
        .target_audience
        .as_ref()
        .map(|roles| {
            roles
                .iter()
                .map(String::as_str)
                .map(Role::from_str)
                .collect::<AppResult<Vec<_>>>()
        })
        .transpose()
        .map_err(|error| invalid("target audience", &error))?;
    let visibility = row
        .visibility
        .as_deref()
        .map(PostVisibility::from_str)
        .transpose()
        .map_err(|error| invalid("visibility", &error))?;
    let body = serde_json::from_value::<ContentBody>(row.body.clone())
        .map_err(|error| invalid("body", &error))?;

    ContentItem::restore(
        ContentId::from_uuid(row.id),
        ContentScope {
            department: row.department,
            branch: row.branch,
            target_audience,
            visibility,
            created_by: row.created_by.map(UserId::from_uuid),
        },
        body,
        row.created_at,
        row.updated_at,
    )
}

fn audience_column(scope: &ContentScope) -> Option<Vec<String>> {
    scope
        .audience()
        .map(|roles| roles.iter().map(|role| role.as_str().to_owned()).collect())
}

fn body_column(item: &ContentItem) -> AppResult<Value> {
    serde_json::to_value(item.body()).map_err(|error| {
        AppError::Internal(format!(
            "failed to serialize body of content '{}': {error}",
            item.id()
        ))
    })
}

#[async_trait]
impl ContentRepository for PostgresContentRepository {
    async fn insert(&self, item: &ContentItem) -> AppResult<()> {
        let scope = item.scope();
        sqlx::query(
            r#"
            INSERT INTO content_items (
                id,
                class,
                department,
                branch,
                target_audience,
                visibility,
                created_by,
                body,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(item.id().as_uuid())
        .bind(item.class().as_str())
        .bind(scope.department.as_deref())
        .bind(scope.branch.as_deref())
        .bind(audience_column(scope))
        .bind(scope.visibility.map(|visibility| visibility.as_str()))
        .bind(scope.created_by.map(|id| id.as_uuid()))
        .bind(body_column(item)?)
        .bind(item.created_at())
        .bind(item.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert content: {error}")))?;

        Ok(())
    }

    async fn find(&self, content_id: ContentId) -> AppResult<Option<ContentItem>> {
        let row = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT {CONTENT_COLUMNS} FROM content_items WHERE id = $1"
        ))
        .bind(content_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find content: {error}")))?;

        row.map(content_item_from_row).transpose()
    }

    async fn list(
        &self,
        class: ContentClass,
        filter: &ViewFilter,
        page: PageRequest,
    ) -> AppResult<Vec<ContentItem>> {
        let limit = i64::try_from(page.limit())
            .map_err(|error| AppError::Validation(format!("invalid content limit: {error}")))?;
        let offset = i64::try_from(page.offset())
            .map_err(|error| AppError::Validation(format!("invalid content offset: {error}")))?;

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "SELECT {CONTENT_COLUMNS} FROM content_items WHERE class = "
        ));
        builder.push_bind(class.as_str());

        if !filter.is_unrestricted() {
            builder.push(" AND ");
            push_view_filter(&mut builder, filter, &CONTENT_SCOPE);
        }

        builder.push(" ORDER BY created_at DESC, id LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let rows = builder
            .build_query_as::<ContentRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to list {} content: {error}",
                    class.as_str()
                ))
            })?;

        rows.into_iter().map(content_item_from_row).collect()
    }

    async fn list_all(&self, class: ContentClass) -> AppResult<Vec<ContentItem>> {
        let rows = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT {CONTENT_COLUMNS} FROM content_items WHERE class = $1 ORDER BY created_at"
        ))
        .bind(class.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list all {} content: {error}",
                class.as_str()
            ))
        })?;

        rows.into_iter().map(content_item_from_row).collect()
    }

    async fn update(&self, item: &ContentItem) -> AppResult<()> {
        let scope = item.scope();
        let result = sqlx::query(
            r#"
            UPDATE content_items
            SET department = $2,
                branch = $3,
                target_audience = $4,
                visibility = $5,
                body = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(item.id().as_uuid())
        .bind(scope.department.as_deref())
        .bind(scope.branch.as_deref())
        .bind(audience_column(scope))
        .bind(scope.visibility.map(|visibility| visibility.as_str()))
        .bind(body_column(item)?)
        .bind(item.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update content: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "content '{}' not found",
                item.id()
            )));
        }

        Ok(())
    }

    async fn delete(&self, content_ids: &[ContentId]) -> AppResult<u64> {
        let ids: Vec<Uuid> = content_ids.iter().map(ContentId::as_uuid).collect();
        let result = sqlx::query("DELETE FROM content_items WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete content: {error}")))?;

        info!(removed = result.rows_affected(), "content deleted");
        Ok(result.rows_affected())
    }
}
