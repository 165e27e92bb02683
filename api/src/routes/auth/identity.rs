use actix_web::HttpResponse;

use ks_shared::ApiResponse;

use crate::dto::WhoAmIResponse;
use crate::middleware::auth::{AuthContext, OptionalAuth};

/// Handler for GET /api/v1/auth/me
pub async fn me(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success("Authenticated", auth.0))
}

/// Handler for GET /api/v1/auth/whoami
///
/// Never fails; anonymous callers get `authenticated: false`.
pub async fn whoami(OptionalAuth(auth): OptionalAuth) -> HttpResponse {
    let response = WhoAmIResponse {
        authenticated: auth.is_some(),
        identity: auth.map(|a| a.0),
    };
    HttpResponse::Ok().json(ApiResponse::success("Identity", response))
}
