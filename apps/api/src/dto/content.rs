use std::str::FromStr;

use alumnet_application::{ContentInput, ContentListQuery, ScopeInput};
use alumnet_core::{AppError, AppResult};
use alumnet_domain::{ContentBody, ContentClass, ContentItem, PostVisibility, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use super::PageParams;

/// Incoming payload for creating or replacing a content item.
///
/// `body` carries the class-specific fields; its `kind` tag defaults to the
/// class named in the path.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/content-request.ts"
)]
pub struct ContentRequest {
    pub department: Option<String>,
    pub branch: Option<String>,
    #[serde(default)]
    pub target_audience: Vec<String>,
    pub visibility: Option<String>,
    #[ts(type = "Record<string, unknown>")]
    pub body: Value,
}

impl ContentRequest {
    /// Parses the payload for records of `class`.
    pub fn into_input(self, class: ContentClass) -> AppResult<ContentInput> {
        let target_audience = self
            .target_audience
            .iter()
            .map(String::as_str)
            .map(Role::from_str)
            .collect::<AppResult<Vec<_>>>()?;
        let visibility = self
            .visibility
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(PostVisibility::from_str)
            .transpose()?;

        let mut body = self.body;
        if let Value::Object(fields) = &mut body {
            fields
                .entry("kind")
                .or_insert_with(|| Value::String(class.as_str().to_owned()));
        }
        let body = serde_json::from_value::<ContentBody>(body)
            .map_err(|error| AppError::Validation(format!("invalid content body: {error}")))?;

        Ok(ContentInput {
            scope: ScopeInput {
                department: self.department,
                branch: self.branch,
                target_audience,
                visibility,
            },
            body,
        })
    }
}

/// Query parameters for content listings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ContentListParams {
    #[serde(default)]
    pub include_expired: bool,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ContentListParams {
    pub fn into_query(self) -> AppResult<ContentListQuery> {
        Ok(ContentListQuery {
            include_expired: self.include_expired,
            page: PageParams {
                limit: self.limit,
                offset: self.offset,
            }
            .into_page()?,
        })
    }
}

/// API representation of a content item.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/content-response.ts"
)]
pub struct ContentResponse {
    pub id: String,
    pub class: String,
    pub department: Option<String>,
    pub branch: Option<String>,
    pub target_audience: Vec<String>,
    pub visibility: Option<String>,
    pub created_by: Option<String>,
    #[ts(type = "Record<string, unknown>")]
    pub body: Value,
    pub expires_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<ContentItem> for ContentResponse {
    type Error = AppError;

    fn try_from(item: ContentItem) -> Result<Self, Self::Error> {
        let body = serde_json::to_value(item.body()).map_err(|error| {
            AppError::Internal(format!(
                "failed to serialize content '{}': {error}",
                item.id()
            ))
        })?;
        let scope = item.scope();

        Ok(Self {
            id: item.id().to_string(),
            class: item.class().as_str().to_owned(),
            department: scope.department.clone(),
            branch: scope.branch.clone(),
            target_audience: scope
                .audience()
                .unwrap_or_default()
                .iter()
                .map(|role| role.as_str().to_owned())
                .collect(),
            visibility: scope
                .visibility
                .map(|visibility| visibility.as_str().to_owned()),
            created_by: scope.created_by.map(|user_id| user_id.to_string()),
            body,
            expires_at: item
                .body()
                .expires_at()
                .map(|expires_at| expires_at.to_rfc3339()),
            created_at: item.created_at().to_rfc3339(),
            updated_at: item.updated_at().to_rfc3339(),
        })
    }
}

/// Result of an expiry purge.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/purge-expired-response.ts"
)]
pub struct PurgeExpiredResponse {
    pub removed: u64,
}
