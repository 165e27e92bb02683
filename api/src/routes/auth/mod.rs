//! Authentication route handlers
//!
//! This module contains all authentication-related endpoints including:
//! - Registration and password login
//! - Refresh token rotation
//! - Logout, per device and everywhere
//! - Session listing and revocation
//! - Identity introspection

pub mod identity;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;
pub mod sessions;

use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    web, HttpRequest,
};
use ks_shared::SessionConfig;

use crate::dto::RefreshTokenRequest;

/// Mount point of these routes; the refresh cookie is scoped to it
pub const AUTH_SCOPE: &str = "/api/v1/auth";

fn same_site(value: &str) -> SameSite {
    match value.to_ascii_lowercase().as_str() {
        "lax" => SameSite::Lax,
        "none" => SameSite::None,
        _ => SameSite::Strict,
    }
}

/// Cookie carrying a freshly issued refresh token
pub fn refresh_cookie(config: &SessionConfig, token: String) -> Cookie<'static> {
    Cookie::build(config.cookie_name.clone(), token)
        .path(AUTH_SCOPE)
        .http_only(config.http_only)
        .secure(config.secure)
        .same_site(same_site(&config.same_site))
        .max_age(CookieDuration::seconds(config.cookie_max_age_seconds()))
        .finish()
}

/// Cookie instructing the client to drop its refresh token
pub fn removal_cookie(config: &SessionConfig) -> Cookie<'static> {
    let mut cookie = refresh_cookie(config, String::new());
    cookie.make_removal();
    cookie
}

/// Refresh token from the body when given, otherwise from the cookie
pub fn presented_refresh_token(
    req: &HttpRequest,
    config: &SessionConfig,
    body: Option<web::Json<RefreshTokenRequest>>,
) -> Option<String> {
    body.and_then(|b| b.into_inner().refresh_token)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            req.cookie(&config.cookie_name)
                .map(|c| c.value().to_string())
                .filter(|t| !t.is_empty())
        })
}
