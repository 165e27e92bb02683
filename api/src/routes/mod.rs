//! Route table

pub mod admin;
pub mod auth;
pub mod health;

use actix_web::web;

use ks_core::services::auth::RateLimitPolicy;

use crate::middleware::{RateLimit, RequireAuth, RequireRole};

/// Registers every route of the API
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope(auth::AUTH_SCOPE)
                .service(
                    web::resource("/register")
                        .wrap(RateLimit::new(RateLimitPolicy::Login))
                        .route(web::post().to(auth::register::register)),
                )
                .service(
                    web::resource("/login")
                        .wrap(RateLimit::new(RateLimitPolicy::Login))
                        .route(web::post().to(auth::login::login)),
                )
                .route("/refresh-token", web::post().to(auth::refresh::refresh_token))
                .service(
                    web::resource("/logout")
                        .wrap(RequireAuth::required())
                        .route(web::post().to(auth::logout::logout)),
                )
                .service(
                    web::resource("/logout-all")
                        .wrap(RequireAuth::required())
                        .route(web::post().to(auth::logout::logout_all)),
                )
                .service(
                    web::resource("/sessions")
                        .wrap(RequireAuth::required())
                        .route(web::get().to(auth::sessions::list_sessions)),
                )
                .service(
                    web::resource("/sessions/{id}")
                        .wrap(RequireAuth::required())
                        .route(web::delete().to(auth::sessions::revoke_session)),
                )
                .service(
                    web::resource("/me")
                        .wrap(RequireAuth::required())
                        .route(web::get().to(auth::identity::me)),
                )
                .service(
                    web::resource("/whoami")
                        .wrap(RequireAuth::optional())
                        .route(web::get().to(auth::identity::whoami)),
                ),
        )
        .service(
            web::scope("/api/v1/admin")
                // Registration order is inside-out: authentication runs first
                .wrap(RequireRole::admin())
                .wrap(RequireAuth::required())
                .route("/users/{id}/block", web::post().to(admin::block_user))
                .route("/users/{id}/unblock", web::post().to(admin::unblock_user))
                .route("/users/{id}/activate", web::post().to(admin::activate_user)),
        );
}
