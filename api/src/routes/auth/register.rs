use actix_web::{web, HttpResponse};
use validator::Validate;

use ks_shared::ApiResponse;

use crate::app::AppState;
use crate::dto::{RegisterRequest, RegisterResponse};
use crate::handlers::ApiError;

/// Handler for POST /api/v1/auth/register
///
/// Creates a password credential. The account is `active` right away unless
/// email verification is required, in which case it starts `pending`.
///
/// ## Errors
/// - 400 Bad Request: Invalid email or password length
/// - 409 Conflict: Email already registered
/// - 429 Too Many Requests: Rate limit exceeded
pub async fn register(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    let credential = state
        .auth_service
        .register(&request.email, &request.password)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(
        "Registration successful",
        RegisterResponse {
            user_id: credential.id,
            email: credential.email,
            status: credential.status,
        },
    )))
}
