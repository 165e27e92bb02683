use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use ks_shared::ApiResponse;

use super::refresh_cookie;
use crate::app::AppState;
use crate::dto::{LoginRequest, TokenResponse};
use crate::handlers::ApiError;
use crate::middleware::{client_ip, user_agent};

/// Handler for POST /api/v1/auth/login
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "success": true,
///     "message": "Login successful",
///     "data": {
///         "accessToken": "eyJ...",
///         "refreshTokenCookie": "refresh_token",
///         "expiresIn": 86400,
///         "tokenType": "Bearer"
///     }
/// }
/// ```
/// The refresh token is set as an HttpOnly cookie.
///
/// ## Errors
/// - 401 Unauthorized: Invalid credentials, unverified or inactive account
/// - 423 Locked: Too many failed attempts
/// - 429 Too Many Requests: Rate limit exceeded
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    let device = request
        .device
        .clone()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| user_agent(&req));

    let pair = state
        .auth_service
        .login(&request.email, &request.password, &device, &client_ip(&req))
        .await?;

    let session = &state.config.auth.session;
    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(session, pair.refresh_token))
        .json(ApiResponse::success(
            "Login successful",
            TokenResponse::bearer(pair.access_token, &session.cookie_name, pair.access_expires_in),
        )))
}
