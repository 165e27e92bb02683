use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use ks_shared::ApiResponse;

use crate::app::AppState;
use crate::dto::SessionResponse;
use crate::handlers::ApiError;
use crate::middleware::auth::AuthContext;

/// Handler for GET /api/v1/auth/sessions
///
/// Lists the caller's live sessions, oldest first. The session matching the
/// request's refresh cookie is flagged `current`.
pub async fn list_sessions(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError> {
    let presented = req
        .cookie(&state.config.auth.session.cookie_name)
        .map(|c| c.value().to_string());

    let sessions: Vec<SessionResponse> = state
        .auth_service
        .list_sessions(&auth)
        .await?
        .iter()
        .map(|s| SessionResponse::from_session(s, presented.as_deref()))
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success("Active sessions", sessions)))
}

/// Handler for DELETE /api/v1/auth/sessions/{id}
///
/// ## Errors
/// - 404 Not Found: No such session for the caller
pub async fn revoke_session(
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    state
        .auth_service
        .revoke_session(&auth, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok("Session revoked")))
}
