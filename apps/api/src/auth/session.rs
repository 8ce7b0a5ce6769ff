use alumnet_application::UserRecord;
use alumnet_core::{AppError, UserIdentity};
use alumnet_domain::{Actor, UserId};
use axum::Extension;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tower_sessions::Session;
use tracing::info;

use crate::dto::UserIdentityResponse;
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;

/// Rotates the session id and stores the identity of `user`.
pub(super) async fn start_session(session: &Session, user: &UserRecord) -> Result<(), AppError> {
    let identity = UserIdentity::new(
        user.id.as_uuid(),
        user.display_name.clone(),
        user.email.clone(),
    );

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    info!(user_id = %user.id, role = %user.role, "session started");
    Ok(())
}

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<UserIdentityResponse>> {
    let user = state
        .user_service
        .get_user(&actor, UserId::from_uuid(identity.user_id()))
        .await?;

    Ok(Json(UserIdentityResponse::from_identity(&identity, &user)))
}
