use crate::{
    api::{admin, attendance, department, leave_request, schedule, user},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

/// Per-route limiter allowing `requests_per_min` with a burst of the same size.
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    // both values are non-zero, so finish() always yields a config
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(refresh_limiter)
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/attendance")
                    .service(web::resource("/clock-in").route(web::post().to(attendance::clock_in)))
                    .service(
                        web::resource("/clock-out").route(web::post().to(attendance::clock_out)),
                    )
                    .service(web::resource("/status").route(web::get().to(attendance::status)))
                    .service(web::resource("/history").route(web::get().to(attendance::history))),
            )
            .service(
                web::scope("/leaves")
                    // /leaves
                    .service(web::resource("").route(web::post().to(leave_request::create_leave)))
                    .service(web::resource("/me").route(web::get().to(leave_request::my_leaves)))
                    .service(
                        web::resource("/pending").route(web::get().to(leave_request::pending_leaves)),
                    )
                    // /leaves/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    // /leaves/{id}/status
                    .service(
                        web::resource("/{id}/status")
                            .route(web::patch().to(leave_request::update_leave_status)),
                    ),
            )
            .service(
                web::scope("/schedules")
                    .service(
                        web::resource("")
                            .route(web::get().to(schedule::list_schedules))
                            .route(web::post().to(schedule::create_schedule)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::patch().to(schedule::update_schedule))
                            .route(web::delete().to(schedule::delete_schedule)),
                    ),
            )
            .service(
                web::scope("/admin")
                    .service(web::resource("/stats").route(web::get().to(admin::stats)))
                    .service(
                        web::resource("/workforce-status")
                            .route(web::get().to(admin::workforce_status)),
                    ),
            )
            .service(
                web::scope("/users")
                    .service(
                        web::resource("")
                            .route(web::get().to(user::list_users))
                            .route(web::post().to(user::create_user)),
                    )
                    // before /{id} so "me" is not taken for an id
                    .service(web::resource("/me").route(web::get().to(user::me)))
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(user::get_user))
                            .route(web::put().to(user::update_user))
                            .route(web::delete().to(user::delete_user)),
                    ),
            )
            .service(
                web::resource("/departments")
                    .route(web::get().to(department::list_departments))
                    .route(web::post().to(department::create_department)),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns a new pair, the old refresh token is revoked
