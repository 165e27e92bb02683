pub mod auth;
pub mod rate_limit;

pub use auth::*;
pub use rate_limit::*;

use actix_web::{http::header::USER_AGENT, HttpRequest};

/// Network origin of the caller: the socket peer address, never a forwarded header
pub fn client_ip(req: &HttpRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Client descriptor from the User-Agent header
pub fn user_agent(req: &HttpRequest) -> String {
    req.headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}
