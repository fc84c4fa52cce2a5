use crate::{
    api::{attendance, regularization},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

// Helper to build per-route limiter config
fn build_limiter(requests_per_min: u32) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        60_000 / requests_per_min as u64
    };
    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("rate limiter configuration must be valid")
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let protected_limiter = build_limiter(config.rate_protected_per_min);
    let clock_limiter = build_limiter(config.rate_clock_per_min);

    // Protected routes. Registration order matters: the literal segments
    // (clock-in, clock-out, regularize) must precede the `{id}` resource.
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(Governor::new(&protected_limiter)) // rate limiting
            .service(
                web::scope("/attendance")
                    // /attendance/clock-in, /attendance/clock-out
                    .service(
                        web::resource("/clock-in")
                            .wrap(Governor::new(&clock_limiter))
                            .route(web::post().to(attendance::clock_in)),
                    )
                    .service(
                        web::resource("/clock-out")
                            .wrap(Governor::new(&clock_limiter))
                            .route(web::post().to(attendance::clock_out)),
                    )
                    // /attendance/regularize
                    .service(
                        web::scope("/regularize")
                            .service(
                                web::resource("")
                                    .route(web::post().to(regularization::submit_request))
                                    .route(web::get().to(regularization::list_requests)),
                            )
                            // /attendance/regularize/{id}
                            .service(
                                web::resource("/{id}")
                                    .route(web::get().to(regularization::get_request))
                                    .route(web::put().to(regularization::decide_request)),
                            ),
                    )
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::post().to(attendance::create_record))
                            .route(web::get().to(attendance::list_attendance)),
                    )
                    // /attendance/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(attendance::get_record))
                            .route(web::put().to(attendance::update_record))
                            .route(web::delete().to(attendance::delete_record)),
                    ),
            ),
    );
}
