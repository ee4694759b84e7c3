use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use dotenv::dotenv;

use crate::config::app_config::AppConfig;
use crate::logger::init_logger;
use crate::services::call_service::CallService;
use crate::services::campaign_service::CampaignService;
use crate::services::dialer_service::DialerService;
use crate::services::language_service::LanguageCatalog;
use crate::services::twilio_service::{TelephonyClient, TwilioService};
use crate::services::webhook_service::WebhookService;

mod app;
mod config;
mod db;
mod error;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = AppConfig::from_env();

    // Conectarnos a la DB y migrar
    let db_pool = db::connect(&config.database_url)
        .await
        .expect("No se pudo conectar a la base de datos SQLite.");
    if let Err(e) = db::run_migrations(&db_pool).await {
        panic!("Fallo en migraciones: {:?}", e);
    }

    // Catálogo de idiomas: se construye una sola vez
    let catalog = Arc::new(LanguageCatalog::new());

    let campaign_service = CampaignService::new(db_pool.clone(), config.default_language.clone());
    let call_service = CallService::new(db_pool.clone());

    let twilio_service = TwilioService::new(&config).expect("No se pudo inicializar TwilioService");
    if config.twilio_account_sid.is_empty() {
        log::warn!("TWILIO_ACCOUNT_SID no definido: las llamadas salientes fallarán");
    }
    let telephony: Arc<dyn TelephonyClient> = Arc::new(twilio_service);

    let dialer_service = DialerService::new(
        campaign_service.clone(),
        call_service.clone(),
        telephony,
        config.webhook_base_url.clone(),
        config.default_language.clone(),
        Duration::from_secs(config.provider_timeout_secs),
    );
    let webhook_service =
        WebhookService::new(call_service.clone(), campaign_service.clone(), catalog.clone());

    // Levantar servidor
    log::info!(
        "Levantando servidor en 0.0.0.0:{} (webhooks en {})",
        config.port,
        config.webhook_base_url
    );
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(catalog.clone()))
            .app_data(web::Data::new(campaign_service.clone()))
            .app_data(web::Data::new(call_service.clone()))
            .app_data(web::Data::new(dialer_service.clone()))
            .app_data(web::Data::new(webhook_service.clone()))
            .configure(app::init_app)
    })
    .bind(("0.0.0.0", config.port))?
    .run()
    .await
}
