use std::str::FromStr;

use alumnet_core::AppError;
use alumnet_domain::{Actor, ContentClass, ContentId, ContentItem};
use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use tracing::info;

use crate::dto::{ContentListParams, ContentRequest, ContentResponse, PurgeExpiredResponse};
use crate::error::ApiResult;
use crate::state::AppState;

fn parse_class(value: &str) -> Result<ContentClass, AppError> {
    ContentClass::from_str(value)
}

/// Loads a visible item and checks it belongs to the class in the path.
async fn visible_item(
    state: &AppState,
    actor: &Actor,
    class: ContentClass,
    content_id: &str,
) -> Result<ContentItem, AppError> {
    let content_id = ContentId::parse(content_id)?;
    let item = state.content_service.get(actor, content_id).await?;
    if item.class() != class {
        return Err(AppError::NotFound(format!(
            "{} '{content_id}' not found",
            class.as_str()
        )));
    }

    Ok(item)
}

pub async fn list_content_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(class): Path<String>,
    Query(params): Query<ContentListParams>,
) -> ApiResult<Json<Vec<ContentResponse>>> {
    let class = parse_class(class.as_str())?;
    let items = state
        .content_service
        .list(&actor, class, params.into_query()?)
        .await?
        .into_iter()
        .map(ContentResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(items))
}

pub async fn create_content_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(class): Path<String>,
    Json(payload): Json<ContentRequest>,
) -> ApiResult<(StatusCode, Json<ContentResponse>)> {
    let class = parse_class(class.as_str())?;
    let item = state
        .content_service
        .create(&actor, class, payload.into_input(class)?)
        .await?;

    Ok((StatusCode::CREATED, Json(ContentResponse::try_from(item)?)))
}

pub async fn get_content_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((class, content_id)): Path<(String, String)>,
) -> ApiResult<Json<ContentResponse>> {
    let class = parse_class(class.as_str())?;
    let item = visible_item(&state, &actor, class, content_id.as_str()).await?;
    Ok(Json(ContentResponse::try_from(item)?))
}

pub async fn update_content_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((class, content_id)): Path<(String, String)>,
    Json(payload): Json<ContentRequest>,
) -> ApiResult<Json<ContentResponse>> {
    let class = parse_class(class.as_str())?;
    let item = visible_item(&state, &actor, class, content_id.as_str()).await?;
    let updated = state
        .content_service
        .update(&actor, item.id(), payload.into_input(class)?)
        .await?;

    Ok(Json(ContentResponse::try_from(updated)?))
}

pub async fn delete_content_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((class, content_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let class = parse_class(class.as_str())?;
    let item = visible_item(&state, &actor, class, content_id.as_str()).await?;
    state.content_service.delete(&actor, item.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn purge_expired_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<PurgeExpiredResponse>> {
    let removed = state
        .content_service
        .purge_expired(&actor, Utc::now())
        .await?;

    info!(removed, actor = %actor.id(), "expired content purged");
    Ok(Json(PurgeExpiredResponse { removed }))
}
