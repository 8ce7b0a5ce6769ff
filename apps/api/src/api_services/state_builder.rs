use std::sync::Arc;

use alumnet_application::{ApprovalService, ContentService, UserService};
use alumnet_infrastructure::{
    Argon2PasswordHasher, PostgresApprovalRepository, PostgresAuditRepository,
    PostgresContentRepository, PostgresUserRepository,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> AppState {
    let user_repository = Arc::new(PostgresUserRepository::new(pool.clone()));
    let approval_repository = Arc::new(PostgresApprovalRepository::new(pool.clone()));
    let content_repository = Arc::new(PostgresContentRepository::new(pool.clone()));
    let audit_repository = Arc::new(PostgresAuditRepository::new(pool));
    let password_hasher = Arc::new(Argon2PasswordHasher::new());

    AppState {
        user_service: UserService::new(
            user_repository.clone(),
            password_hasher,
            audit_repository.clone(),
        ),
        approval_service: ApprovalService::new(
            approval_repository,
            user_repository,
            audit_repository.clone(),
        ),
        content_service: ContentService::new(content_repository, audit_repository),
        frontend_url: config.frontend_url.clone(),
        bootstrap_token: config.bootstrap_token.clone(),
    }
}
