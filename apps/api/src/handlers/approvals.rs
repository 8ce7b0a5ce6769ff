use alumnet_domain::{Actor, UserId};
use axum::Json;
use axum::extract::{Extension, Path, State};

use crate::dto::{ApprovalResponse, BranchManagerGrantResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_pending_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<ApprovalResponse>>> {
    let records = state
        .approval_service
        .list_pending(&actor)
        .await?
        .into_iter()
        .map(ApprovalResponse::from)
        .collect();

    Ok(Json(records))
}

pub async fn approve_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ApprovalResponse>> {
    let record = state
        .approval_service
        .approve(&actor, UserId::parse(user_id.as_str())?)
        .await?;

    Ok(Json(ApprovalResponse::from(record)))
}

pub async fn reject_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ApprovalResponse>> {
    let record = state
        .approval_service
        .reject(&actor, UserId::parse(user_id.as_str())?)
        .await?;

    Ok(Json(ApprovalResponse::from(record)))
}

pub async fn get_branch_manager_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<BranchManagerGrantResponse>> {
    let grant = state
        .approval_service
        .branch_manager_grant(&actor, UserId::parse(user_id.as_str())?)
        .await?;

    Ok(Json(BranchManagerGrantResponse::from(grant)))
}

pub async fn assign_branch_manager_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<BranchManagerGrantResponse>> {
    let grant = state
        .approval_service
        .assign_branch_manager(&actor, UserId::parse(user_id.as_str())?)
        .await?;

    Ok(Json(BranchManagerGrantResponse::from(grant)))
}

pub async fn remove_branch_manager_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<BranchManagerGrantResponse>> {
    let grant = state
        .approval_service
        .remove_branch_manager(&actor, UserId::parse(user_id.as_str())?)
        .await?;

    Ok(Json(BranchManagerGrantResponse::from(grant)))
}
