//! Application state and factory
//!
//! This module wires the core services over a set of infrastructure adapters
//! and builds the Actix-web application around them.

use std::sync::Arc;

use actix_web::{web, App};

use ks_core::services::auth::{AuthGuard, AuthService, AuthServiceConfig, RateLimiter};
use ks_core::services::token::{TokenService, TokenServiceConfig};
use ks_core::{Clock, DomainError};
use ks_infra::InfrastructureServices;
use ks_shared::AppConfig;

use crate::handlers::{not_found, ApiError};
use crate::routes;

/// Shared services handed to every handler and middleware
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub guard: Arc<AuthGuard>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub clock: Arc<dyn Clock>,
    pub config: AppConfig,
}

impl AppState {
    /// Builds the services from configuration and adapters
    ///
    /// Fails when the signing keys are misconfigured.
    pub fn build(
        config: AppConfig,
        infra: InfrastructureServices,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DomainError> {
        let tokens = Arc::new(TokenService::new(
            TokenServiceConfig::from(&config.auth.jwt),
            clock.clone(),
        )?);

        let auth_service = Arc::new(AuthService::new(
            infra.credentials.clone(),
            tokens.clone(),
            infra.password_hasher.clone(),
            infra.email_sender.clone(),
            clock.clone(),
            AuthServiceConfig::from(&config.auth),
        ));

        let guard = Arc::new(AuthGuard::new(
            infra.credentials.clone(),
            tokens.clone(),
            auth_service.lock_policy().clone(),
            clock.clone(),
        ));

        Ok(Self {
            auth_service,
            guard,
            rate_limiter: infra.rate_limiter,
            clock,
            config,
        })
    }
}

/// Create and configure the application with all dependencies
pub fn create_app(
    app_state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(app_state)
        // Malformed bodies and path segments use the error envelope too
        .app_data(
            web::JsonConfig::default()
                .error_handler(|err, _req| ApiError::validation(err.to_string()).into()),
        )
        .app_data(
            web::PathConfig::default()
                .error_handler(|err, _req| ApiError::validation(err.to_string()).into()),
        )
        .configure(routes::configure)
        .default_service(web::route().to(not_found))
}
