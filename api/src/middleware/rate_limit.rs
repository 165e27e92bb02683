//! Rate limiting middleware for authentication endpoints
//!
//! Each wrapped resource is counted under one policy, keyed by the caller
//! fingerprint (peer address plus User-Agent). Rejections carry
//! `Retry-After`; accepted responses carry `X-RateLimit-Remaining`.

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    web, Error,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};

use ks_core::errors::{AuthError, DomainError};
use ks_core::Clock;
use ks_core::services::auth::{fingerprint, RateLimitPolicy};
use ks_shared::{RateLimitConfig, WindowLimit};

use super::{client_ip, user_agent};
use crate::app::AppState;
use crate::handlers::ApiError;

const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Window configured for a policy
pub fn limit_for(config: &RateLimitConfig, policy: RateLimitPolicy) -> WindowLimit {
    match policy {
        RateLimitPolicy::Login => config.login,
        RateLimitPolicy::PasswordReset => config.password_reset,
        RateLimitPolicy::VerificationResend => config.verification_resend,
    }
}

/// Rate limiter middleware factory
pub struct RateLimit {
    policy: RateLimitPolicy,
}

impl RateLimit {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self { policy }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            policy: self.policy,
        }))
    }
}

/// Rate limiter middleware service
pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    policy: RateLimitPolicy,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let policy = self.policy;

        Box::pin(async move {
            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                return Err(ApiError::from(DomainError::Internal {
                    message: "application state is not configured".to_string(),
                })
                .into());
            };

            if !state.config.rate_limit.enabled {
                return service.call(req).await;
            }

            let caller = fingerprint(&client_ip(req.request()), &user_agent(req.request()));
            let decision = state
                .rate_limiter
                .allow(&policy.key(&caller), limit_for(&state.config.rate_limit, policy))
                .await
                .map_err(ApiError::from)?;

            if !decision.allowed {
                let retry_after_seconds = decision.retry_after_seconds(state.clock.now());
                tracing::warn!(
                    policy = policy.as_str(),
                    retry_after_seconds,
                    "Request rejected by rate limiter"
                );
                return Err(ApiError::from(AuthError::RateLimitExceeded {
                    retry_after_seconds,
                })
                .into());
            }

            let mut response = service.call(req).await?;
            response
                .headers_mut()
                .insert(
                    HeaderName::from_static(REMAINING_HEADER),
                    HeaderValue::from(decision.remaining),
                );
            Ok(response)
        })
    }
}
