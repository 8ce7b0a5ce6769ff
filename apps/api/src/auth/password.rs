use std::str::FromStr;

use alumnet_application::{AuthOutcome, RegisterParams};
use alumnet_core::AppError;
use alumnet_domain::Role;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tower_sessions::Session;
use tracing::{info, warn};

use crate::dto::{
    AuthLoginRequest, AuthLoginResponse, AuthRegisterRequest, GenericMessageResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::session::start_session;

pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<AuthRegisterRequest>,
) -> ApiResult<(StatusCode, Json<GenericMessageResponse>)> {
    let role = Role::from_str(payload.role.as_str())?;

    let user_id = state
        .user_service
        .register(RegisterParams {
            email: payload.email,
            password: payload.password,
            display_name: payload.display_name,
            role,
            department: payload.department,
            branch: payload.branch,
        })
        .await?;

    info!(%user_id, %role, "registration awaiting approval");
    Ok((
        StatusCode::CREATED,
        Json(GenericMessageResponse {
            message: "registration received; the account is pending approval".to_owned(),
        }),
    ))
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AuthLoginRequest>,
) -> ApiResult<Json<AuthLoginResponse>> {
    let status = match state
        .user_service
        .login(&payload.email, &payload.password)
        .await?
    {
        AuthOutcome::Authenticated(user) => {
            start_session(&session, &user).await?;
            "authenticated"
        }
        AuthOutcome::PendingApproval => "pending_approval",
        AuthOutcome::Rejected => "rejected",
        AuthOutcome::Failed => {
            warn!("login failed");
            return Err(AppError::Unauthorized("invalid credentials".to_owned()).into());
        }
    };

    Ok(Json(AuthLoginResponse {
        status: status.to_owned(),
    }))
}
