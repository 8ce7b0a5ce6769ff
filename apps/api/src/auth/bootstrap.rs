use alumnet_application::BootstrapAdminParams;
use alumnet_core::AppError;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tower_sessions::Session;

use crate::dto::AuthBootstrapRequest;
use crate::error::ApiResult;
use crate::state::AppState;

use super::session::start_session;

/// Creates the first administrator and signs it in.
pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AuthBootstrapRequest>,
) -> ApiResult<StatusCode> {
    if payload.token != state.bootstrap_token {
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let admin = state
        .user_service
        .bootstrap_admin(BootstrapAdminParams {
            email: payload.email,
            password: payload.password,
            display_name: payload.display_name,
        })
        .await?;

    start_session(&session, &admin).await?;
    Ok(StatusCode::CREATED)
}
