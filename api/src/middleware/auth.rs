//! Bearer authentication middleware for protecting API endpoints.
//!
//! `RequireAuth` runs the guard on the Authorization header and injects the
//! resulting identity into the request. In optional mode a failed check
//! lets the request through without an identity. `RequireRole` is the second
//! stage and must be wrapped inside `RequireAuth`.

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    ops::Deref,
    rc::Rc,
    task::{Context, Poll},
};

use ks_core::domain::entities::Role;
use ks_core::domain::value_objects::Identity;
use ks_core::errors::{AuthError, DomainError};
use ks_core::services::auth::AuthGuard;

use super::client_ip;
use crate::app::AppState;
use crate::handlers::ApiError;

/// Identity of the authenticated caller, injected by [`RequireAuth`]
#[derive(Debug, Clone)]
pub struct AuthContext(pub Identity);

impl Deref for AuthContext {
    type Target = Identity;

    fn deref(&self) -> &Identity {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthMode {
    Required,
    Optional,
}

/// Authentication middleware factory
pub struct RequireAuth {
    mode: AuthMode,
}

impl RequireAuth {
    /// Rejects the request unless the guard accepts its bearer token
    pub fn required() -> Self {
        Self {
            mode: AuthMode::Required,
        }
    }

    /// Attaches an identity when possible and never rejects
    pub fn optional() -> Self {
        Self {
            mode: AuthMode::Optional,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthMiddleware {
            service: Rc::new(service),
            mode: self.mode,
        }))
    }
}

/// Authentication middleware service
pub struct RequireAuthMiddleware<S> {
    service: Rc<S>,
    mode: AuthMode,
}

impl<S, B> Service<ServiceRequest> for RequireAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let mode = self.mode;

        Box::pin(async move {
            let guard = match req.app_data::<web::Data<AppState>>() {
                Some(state) => state.guard.clone(),
                None => {
                    return Err(ApiError::from(DomainError::Internal {
                        message: "application state is not configured".to_string(),
                    })
                    .into())
                }
            };

            let authorization = authorization_header(&req);
            let origin = client_ip(req.request());

            match mode {
                AuthMode::Required => {
                    let identity = authenticate(&guard, authorization.as_deref(), &origin).await?;
                    req.extensions_mut().insert(AuthContext(identity));
                }
                AuthMode::Optional => {
                    if let Some(identity) = guard
                        .authenticate_optional(authorization.as_deref(), &origin)
                        .await
                    {
                        req.extensions_mut().insert(AuthContext(identity));
                    }
                }
            }

            service.call(req).await
        })
    }
}

async fn authenticate(
    guard: &AuthGuard,
    authorization: Option<&str>,
    origin: &str,
) -> Result<Identity, ApiError> {
    guard
        .authenticate(authorization, origin)
        .await
        .map_err(|e| {
            tracing::debug!(code = e.code(), "Request rejected by auth guard");
            ApiError::from(e)
        })
}

/// Raw Authorization header value; the guard does the bearer parsing
fn authorization_header(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()
        .map(|s| s.to_string())
}

/// Role authorization middleware factory
pub struct RequireRole {
    allowed: Rc<[Role]>,
}

impl RequireRole {
    pub fn new(allowed: &[Role]) -> Self {
        Self {
            allowed: Rc::from(allowed),
        }
    }

    pub fn admin() -> Self {
        Self::new(&[Role::Admin])
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            allowed: self.allowed.clone(),
        }))
    }
}

/// Role authorization middleware service
pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    allowed: Rc<[Role]>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let identity = req.extensions().get::<AuthContext>().cloned();
        let decision = match identity {
            Some(context) => AuthGuard::authorize(&context, &self.allowed),
            // Wrapped outside RequireAuth, or no identity was attached
            None => Err(AuthError::MissingToken),
        };

        match decision {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(e) => Box::pin(ready(Err(ApiError::from(e).into()))),
        }
    }
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::from(AuthError::MissingToken).into());

        ready(result)
    }
}

/// Extractor for optional authentication
pub struct OptionalAuth(pub Option<AuthContext>);

impl FromRequest for OptionalAuth {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let auth = req.extensions().get::<AuthContext>().cloned();
        ready(Ok(OptionalAuth(auth)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use ks_core::domain::entities::AccountStatus;
    use uuid::Uuid;

    fn identity(role: Role) -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            email: "ivan@example.com".to_string(),
            role,
            status: AccountStatus::Active,
        }
    }

    #[::std::prelude::v1::test]
    fn test_authorization_header() {
        let req = test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer test_token_123"))
            .to_srv_request();
        assert_eq!(
            authorization_header(&req),
            Some("Bearer test_token_123".to_string())
        );

        let req_no_header = test::TestRequest::default().to_srv_request();
        assert_eq!(authorization_header(&req_no_header), None);
    }

    #[actix_web::test]
    async fn test_extractors() {
        let req = test::TestRequest::default().to_http_request();
        let mut payload = actix_web::dev::Payload::None;
        assert!(AuthContext::from_request(&req, &mut payload).await.is_err());
        let OptionalAuth(missing) = OptionalAuth::from_request(&req, &mut payload).await.unwrap();
        assert!(missing.is_none());

        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthContext(identity(Role::User)));
        let context = AuthContext::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(context.role, Role::User);
    }
}
