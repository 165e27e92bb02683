use actix_web::{web, HttpRequest, HttpResponse};

use ks_shared::ApiResponse;

use super::{presented_refresh_token, removal_cookie};
use crate::app::AppState;
use crate::dto::{LogoutAllResponse, RefreshTokenRequest};
use crate::handlers::ApiError;
use crate::middleware::auth::AuthContext;

/// Handler for POST /api/v1/auth/logout
///
/// Ends the session of the presented refresh token and clears the cookie.
/// Logging out an already ended session is not an error.
///
/// # Headers
///
/// ```text
/// Authorization: Bearer {access_token}
/// ```
pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
    request: Option<web::Json<RefreshTokenRequest>>,
) -> Result<HttpResponse, ApiError> {
    let session = &state.config.auth.session;
    let token = presented_refresh_token(&req, session, request);

    state.auth_service.logout(&auth, token.as_deref()).await?;

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(session))
        .json(ApiResponse::ok("Logged out successfully")))
}

/// Handler for POST /api/v1/auth/logout-all
///
/// Ends every session of the caller.
pub async fn logout_all(
    state: web::Data<AppState>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError> {
    let revoked_sessions = state.auth_service.logout_all(&auth).await?;

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(&state.config.auth.session))
        .json(ApiResponse::success(
            "Logged out of all sessions",
            LogoutAllResponse { revoked_sessions },
        )))
}
