use crate::{
    api::{attendance, report},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    // Ingestion is heavyweight (file IO + classification); reads are cheap.
    let upload_limiter = Arc::new(build_limiter(config.rate_upload_per_min));
    let report_limiter = Arc::new(build_limiter(config.rate_report_per_min));

    cfg.service(
        web::scope(&config.api_prefix).service(
            web::scope("/attendance")
                // /attendance/upload
                .service(
                    web::resource("/upload")
                        .wrap(upload_limiter.clone())
                        .route(web::post().to(attendance::upload_batch)),
                )
                // /attendance/report
                .service(
                    web::resource("/report")
                        .wrap(report_limiter.clone())
                        .route(web::get().to(report::monthly_report)),
                )
                // /attendance/report/{employee_id}
                .service(
                    web::resource("/report/{employee_id}")
                        .wrap(report_limiter.clone())
                        .route(web::get().to(report::employee_detail)),
                )
                // /attendance/records/{employee_id}
                .service(
                    web::resource("/records/{employee_id}")
                        .wrap(report_limiter)
                        .route(web::get().to(report::employee_records)),
                ),
        ),
    );
}
