use alumnet_application::{ApprovalService, ContentService, UserService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub approval_service: ApprovalService,
    pub content_service: ContentService,
    pub frontend_url: String,
    pub bootstrap_token: String,
}
