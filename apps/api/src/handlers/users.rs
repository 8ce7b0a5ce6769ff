use alumnet_domain::{Actor, UserId};
use axum::Json;
use axum::extract::{Extension, Path, Query, State};

use crate::dto::{
    DirectoryResponse, ScopeClaimParams, ScopeClaimResponse, UpdateUserScopeRequest,
    UserListParams, UserResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<UserListParams>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .user_service
        .list_users(&actor, params.into_query()?)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .user_service
        .get_user(&actor, UserId::parse(user_id.as_str())?)
        .await?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn update_user_scope_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserScopeRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .user_service
        .update_user_scope(
            &actor,
            UserId::parse(user_id.as_str())?,
            payload.into_update()?,
        )
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Public list of departments and branches for the registration form.
pub async fn directory_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<DirectoryResponse>> {
    let directory = state.user_service.directory().await?;
    Ok(Json(DirectoryResponse::from(directory)))
}

pub async fn scope_claim_handler(
    State(state): State<AppState>,
    Query(params): Query<ScopeClaimParams>,
) -> ApiResult<Json<ScopeClaimResponse>> {
    let check = state
        .user_service
        .validate_scope_claim(params.department.as_deref(), params.branch.as_deref())
        .await?;

    Ok(Json(ScopeClaimResponse::from(check)))
}
