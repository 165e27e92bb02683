//! Administrative account status transitions
//!
//! Mounted behind `RequireAuth` and `RequireRole::admin()`.

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use ks_core::domain::entities::AccountStatus;
use ks_core::errors::{AuthError, DomainError, DomainResult};
use ks_shared::ApiResponse;

use crate::app::AppState;
use crate::dto::StatusResponse;
use crate::handlers::ApiError;
use crate::middleware::auth::AuthContext;

/// A missing target account is a 404 here, not an authentication failure
fn status_result(
    user_id: Uuid,
    result: DomainResult<AccountStatus>,
    message: &str,
) -> Result<HttpResponse, ApiError> {
    match result {
        Ok(status) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            message,
            StatusResponse { user_id, status },
        ))),
        Err(DomainError::Auth(AuthError::UserNotFound)) => Err(ApiError::not_found("user")),
        Err(e) => Err(e.into()),
    }
}

/// Handler for POST /api/v1/admin/users/{id}/block
///
/// Blocks an active account and ends all of its sessions.
///
/// ## Errors
/// - 403 Forbidden: Caller is not an admin
/// - 404 Not Found: No such user
/// - 409 Conflict: Account is not active
pub async fn block_user(
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    tracing::info!(admin_id = %auth.user_id, user_id = %user_id, "Block requested");
    status_result(user_id, state.auth_service.block(user_id).await, "Account blocked")
}

/// Handler for POST /api/v1/admin/users/{id}/unblock
pub async fn unblock_user(
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    tracing::info!(admin_id = %auth.user_id, user_id = %user_id, "Unblock requested");
    status_result(user_id, state.auth_service.unblock(user_id).await, "Account unblocked")
}

/// Handler for POST /api/v1/admin/users/{id}/activate
///
/// Marks a pending account's email as verified.
pub async fn activate_user(
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    tracing::info!(admin_id = %auth.user_id, user_id = %user_id, "Activation requested");
    status_result(user_id, state.auth_service.activate(user_id).await, "Account activated")
}
