use alumnet_core::{AppError, UserIdentity};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use tower_sessions::Session;
use tracing::debug;

use crate::auth::SESSION_USER_KEY;
use crate::error::ApiResult;
use crate::state::AppState;

/// Loads the session identity and re-reads the caller's role and scope.
///
/// Handlers behind this layer receive both the [`UserIdentity`] and the
/// resolved [`alumnet_domain::Actor`] as request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let actor = state.user_service.resolve_actor(&identity).await?;
    debug!(user_id = %actor.id(), role = %actor.role(), "request actor resolved");

    request.extensions_mut().insert(identity);
    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method())
        && !is_same_origin(request.headers(), state.frontend_url.as_str())
    {
        return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
    }

    Ok(next.run(request).await)
}

fn is_same_origin(headers: &HeaderMap, allowed_origin: &str) -> bool {
    if headers
        .get("sec-fetch-site")
        .is_some_and(|fetch_site| fetch_site == HeaderValue::from_static("cross-site"))
    {
        return false;
    }

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let referer = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    origin == allowed_origin || referer_matches_origin(referer, allowed_origin)
}

/// The referer must continue the origin with a path, query or fragment, so
/// `http://host:3000.other.example` does not pass for `http://host:3000`.
fn referer_matches_origin(referer: &str, allowed_origin: &str) -> bool {
    let allowed_origin = allowed_origin.trim_end_matches('/');
    referer
        .strip_prefix(allowed_origin)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRONTEND: &str = "http://localhost:3000";

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_static(*value));
        }
        headers
    }

    #[test]
    fn accepts_matching_origin_or_referer() {
        assert!(is_same_origin(&headers(&[("origin", FRONTEND)]), FRONTEND));
        assert!(is_same_origin(
            &headers(&[("referer", "http://localhost:3000/events")]),
            FRONTEND
        ));
    }

    #[test]
    fn rejects_foreign_or_cross_site_requests() {
        assert!(!is_same_origin(&HeaderMap::new(), FRONTEND));
        assert!(!is_same_origin(
            &headers(&[("origin", "https://evil.example")]),
            FRONTEND
        ));
        assert!(!is_same_origin(
            &headers(&[("origin", FRONTEND), ("sec-fetch-site", "cross-site")]),
            FRONTEND
        ));
    }

    #[test]
    fn referer_must_end_at_the_origin_boundary() {
        assert!(!is_same_origin(
            &headers(&[("referer", "http://localhost:3000.evil.example/events")]),
            FRONTEND
        ));
        assert!(!is_same_origin(
            &headers(&[("referer", "http://localhost:30001/")]),
            FRONTEND
        ));
        assert!(is_same_origin(
            &headers(&[("referer", "http://localhost:3000?next=/events")]),
            FRONTEND
        ));
        assert!(referer_matches_origin(
            "http://localhost:3000/",
            "http://localhost:3000/"
        ));
    }

    #[test]
    fn only_mutations_are_checked() {
        assert!(is_state_changing_method(&Method::DELETE));
        assert!(!is_state_changing_method(&Method::GET));
    }
}
