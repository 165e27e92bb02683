use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use ks_core::domain::entities::{hash_refresh_token, AccountStatus, Session};
use ks_core::domain::value_objects::Identity;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,

    /// Device descriptor; the User-Agent is used when absent
    #[validate(length(max = 256))]
    pub device: Option<String>,
}

/// Body form of the refresh token, for clients that do not keep cookies
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[serde(default, alias = "refresh_token")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub email: String,
    pub status: AccountStatus,
}

/// Issued access token; the refresh token travels in the named cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token_cookie: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String, cookie_name: &str, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token_cookie: cookie_name.to_string(),
            expires_in,
            token_type: "Bearer".to_string(),
        }
    }
}

/// Session as shown to its owner; never includes token material
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: Uuid,
    pub device: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Whether this session belongs to the refresh cookie sent with the request
    pub current: bool,
}

impl SessionResponse {
    pub fn from_session(session: &Session, presented_token: Option<&str>) -> Self {
        Self {
            id: session.id,
            device: session.device.clone(),
            issued_at: session.issued_at,
            expires_at: session.expires_at,
            current: presented_token
                .map(|token| hash_refresh_token(token) == session.token_hash)
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutAllResponse {
    pub revoked_sessions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub user_id: Uuid,
    pub status: AccountStatus,
}
