use alumnet_core::AppError;
use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route("/api/users", get(handlers::users::list_users_handler))
        .route(
            "/api/users/{user_id}",
            get(handlers::users::get_user_handler),
        )
        .route(
            "/api/users/{user_id}/scope",
            put(handlers::users::update_user_scope_handler),
        )
        .route(
            "/api/approvals/pending",
            get(handlers::approvals::list_pending_handler),
        )
        .route(
            "/api/approvals/{user_id}/approve",
            post(handlers::approvals::approve_handler),
        )
        .route(
            "/api/approvals/{user_id}/reject",
            post(handlers::approvals::reject_handler),
        )
        .route(
            "/api/branch-managers/{user_id}",
            get(handlers::approvals::get_branch_manager_handler)
                .put(handlers::approvals::assign_branch_manager_handler)
                .delete(handlers::approvals::remove_branch_manager_handler),
        )
        .route(
            "/api/admin/content/purge-expired",
            post(handlers::content::purge_expired_handler),
        )
        .route(
            "/api/content/{class}",
            get(handlers::content::list_content_handler)
                .post(handlers::content::create_content_handler),
        )
        .route(
            "/api/content/{class}/{content_id}",
            get(handlers::content::get_content_handler)
                .put(handlers::content::update_content_handler)
                .delete(handlers::content::delete_content_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    let cors_layer = cors::build_cors_layer(frontend_url)?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/bootstrap", post(auth::bootstrap_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/api/directory", get(handlers::users::directory_handler))
        .route(
            "/api/directory/scope-claim",
            get(handlers::users::scope_claim_handler),
        )
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}
