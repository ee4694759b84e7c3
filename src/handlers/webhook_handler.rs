//! handlers/webhook_handler.rs
//! Endpoints que invoca Twilio. Siempre responden 200 con TwiML.

use actix_web::{web, HttpResponse};

use crate::models::webhook_model::{DigitsInput, StatusCallback, VoiceQuery};
use crate::services::webhook_service::{WebhookService, EMPTY_TWIML};

fn twiml(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/xml; charset=utf-8")
        .body(body)
}

/// POST /api/webhook/voice?call_id=&language=
pub async fn voice_webhook_endpoint(
    webhook_service: web::Data<WebhookService>,
    query: web::Query<VoiceQuery>,
) -> HttpResponse {
    twiml(webhook_service.on_voice(query.into_inner()).await)
}

/// POST /api/webhook/gather
pub async fn gather_webhook_endpoint(
    webhook_service: web::Data<WebhookService>,
    form: web::Form<DigitsInput>,
) -> HttpResponse {
    twiml(webhook_service.on_digits(form.into_inner()).await)
}

/// POST /api/webhook/optout
pub async fn opt_out_webhook_endpoint(
    webhook_service: web::Data<WebhookService>,
    form: web::Form<DigitsInput>,
) -> HttpResponse {
    twiml(webhook_service.on_opt_out(form.into_inner()).await)
}

/// POST /api/webhook/status
pub async fn status_webhook_endpoint(
    webhook_service: web::Data<WebhookService>,
    form: web::Form<StatusCallback>,
) -> HttpResponse {
    webhook_service.on_status(form.into_inner()).await;
    twiml(EMPTY_TWIML.to_string())
}
