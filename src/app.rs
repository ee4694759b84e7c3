//! app.rs
use crate::handlers::{call_handler, campaign_handler, system_handler, webhook_handler};
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/campaigns")
                    .route(
                        "",
                        web::post().to(campaign_handler::create_campaign_endpoint),
                    )
                    .route(
                        "",
                        web::get().to(campaign_handler::list_campaigns_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::get().to(campaign_handler::get_campaign_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::put().to(campaign_handler::update_campaign_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::delete().to(campaign_handler::delete_campaign_endpoint),
                    )
                    .route(
                        "/{id}/calls",
                        web::get().to(campaign_handler::campaign_calls_endpoint),
                    ),
            )
            .service(
                web::scope("/calls")
                    .route("/bulk", web::post().to(call_handler::bulk_calls_endpoint))
                    .route("/{id}", web::get().to(call_handler::get_call_endpoint)),
            )
            .service(
                web::scope("/webhook")
                    .route(
                        "/voice",
                        web::post().to(webhook_handler::voice_webhook_endpoint),
                    )
                    .route(
                        "/gather",
                        web::post().to(webhook_handler::gather_webhook_endpoint),
                    )
                    .route(
                        "/status",
                        web::post().to(webhook_handler::status_webhook_endpoint),
                    )
                    .route(
                        "/optout",
                        web::post().to(webhook_handler::opt_out_webhook_endpoint),
                    ),
            )
            .route("/health", web::get().to(system_handler::health_endpoint))
            .route("/languages", web::get().to(system_handler::languages_endpoint)),
    );
}
