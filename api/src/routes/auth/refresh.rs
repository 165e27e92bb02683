use actix_web::{web, HttpRequest, HttpResponse};

use ks_core::errors::AuthError;
use ks_shared::ApiResponse;

use super::{presented_refresh_token, refresh_cookie};
use crate::app::AppState;
use crate::dto::{RefreshTokenRequest, TokenResponse};
use crate::handlers::ApiError;

/// Handler for POST /api/v1/auth/refresh-token
///
/// Exchanges a refresh token, taken from the body or the refresh cookie,
/// for a new access token and a rotated refresh cookie. The presented token
/// stops working immediately.
///
/// ## Errors
/// - 401 Unauthorized: Missing, invalid, expired or already rotated refresh token
/// - 423 Locked: Account is locked
pub async fn refresh_token(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: Option<web::Json<RefreshTokenRequest>>,
) -> Result<HttpResponse, ApiError> {
    let session = &state.config.auth.session;
    let token = presented_refresh_token(&req, session, request)
        .ok_or(AuthError::InvalidRefreshToken)?;

    let pair = state.auth_service.refresh(&token).await?;

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(session, pair.refresh_token))
        .json(ApiResponse::success(
            "Token refreshed",
            TokenResponse::bearer(pair.access_token, &session.cookie_name, pair.access_expires_in),
        )))
}
