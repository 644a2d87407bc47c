use crate::{
    api::{attendance, employee, punch, regularization},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter config
    fn build_limiter(requests_per_min: u32) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap()
    }

    let login_limiter = build_limiter(config.rate_login_per_min);
    let register_limiter = build_limiter(config.rate_register_per_min);
    let refresh_limiter = build_limiter(config.rate_refresh_per_min);
    let feed_limiter = build_limiter(config.rate_feed_per_min);
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(Governor::new(&register_limiter))
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(Governor::new(&refresh_limiter))
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .service(handlers::protected)
            .service(
                // the controller feed gets its own, looser limiter
                web::scope("/punch")
                    .service(
                        web::resource("")
                            .wrap(Governor::new(&feed_limiter))
                            .route(web::post().to(punch::ingest_punch))
                            .route(web::get().to(punch::list_punches)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .wrap(Governor::new(&protected_limiter)) // rate limiting
                    // /attendance/report
                    .service(
                        web::resource("/report")
                            .route(web::get().to(attendance::attendance_report)),
                    )
                    // /attendance/exceptions
                    .service(
                        web::resource("/exceptions")
                            .route(web::get().to(attendance::attendance_exceptions)),
                    ),
            )
            .service(
                web::scope("/regularization")
                    .wrap(Governor::new(&protected_limiter))
                    // /regularization
                    .service(
                        web::resource("")
                            .route(web::get().to(regularization::regularization_list))
                            .route(web::post().to(regularization::create_regularization)),
                    )
                    // /regularization/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(regularization::get_regularization))
                            .route(web::put().to(regularization::update_regularization)),
                    )
                    // /regularization/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(regularization::approve_regularization)),
                    )
                    // /regularization/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(regularization::reject_regularization)),
                    ),
            )
            .service(
                web::scope("/employee")
                    .wrap(Governor::new(&protected_limiter))
                    // /employee
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employee/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)
//
// CONTROLLER FEED
//  └─ POST /punch with an api-user bearer token
//
// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
