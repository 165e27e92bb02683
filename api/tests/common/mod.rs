//! Shared setup for the HTTP tests

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{
    cookie::Cookie,
    dev::ServiceResponse,
    http::header::{HeaderName, AUTHORIZATION, USER_AGENT},
    test::TestRequest,
    web,
};
use serde_json::{json, Value};
use uuid::Uuid;

use ks_api::AppState;
use ks_core::domain::entities::{AccountStatus, Credential, Role};
use ks_core::{Clock, CredentialRepository, ManualClock, PasswordHasher};
use ks_infra::InfrastructureServices;
use ks_shared::AppConfig;

pub const PASSWORD: &str = "correct horse battery staple";
pub const COOKIE: &str = "refresh_token";
pub const AUTH: &str = "/api/v1/auth";

pub struct TestApp {
    pub state: web::Data<AppState>,
    pub infra: InfrastructureServices,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    /// No failure padding and no rate limiting
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.auth.min_failure_latency_ms = 0;
        config.rate_limit.enabled = false;
        adjust(&mut config);

        let clock = Arc::new(ManualClock::starting_now());
        let infra = InfrastructureServices::in_memory(clock.clone(), 4).unwrap();
        let state = web::Data::new(AppState::build(config, infra.clone(), clock.clone()).unwrap());

        Self {
            state,
            infra,
            clock,
        }
    }

    /// Stores an account directly, bypassing registration
    pub async fn seed(&self, email: &str, role: Role, status: AccountStatus) -> Uuid {
        let hash = self.infra.password_hasher.hash(PASSWORD).unwrap();
        let credential = Credential::new(email, Some(hash), role, status, self.clock.now());
        self.infra.credentials.create(credential).await.unwrap().id
    }
}

pub fn register(email: &str) -> TestRequest {
    TestRequest::post()
        .uri(&format!("{}/register", AUTH))
        .set_json(json!({ "email": email, "password": PASSWORD }))
}

pub fn login(email: &str, password: &str, device: &str) -> TestRequest {
    TestRequest::post()
        .uri(&format!("{}/login", AUTH))
        .insert_header((USER_AGENT, "integration-tests"))
        .set_json(json!({ "email": email, "password": password, "device": device }))
}

pub fn refresh_with_cookie(token: &str) -> TestRequest {
    TestRequest::post()
        .uri(&format!("{}/refresh-token", AUTH))
        .cookie(Cookie::new(COOKIE, token.to_string()))
}

pub fn refresh_with_body(token: &str) -> TestRequest {
    TestRequest::post()
        .uri(&format!("{}/refresh-token", AUTH))
        .set_json(json!({ "refreshToken": token }))
}

pub fn bearer(token: &str) -> (HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {}", token))
}

/// Value of the refresh cookie set on a response
pub fn refresh_cookie<B>(resp: &ServiceResponse<B>) -> Option<String> {
    resp.response()
        .cookies()
        .find(|c| c.name() == COOKIE)
        .map(|c| c.value().to_string())
}

pub fn access_token(body: &Value) -> String {
    body["data"]["accessToken"].as_str().unwrap().to_string()
}
