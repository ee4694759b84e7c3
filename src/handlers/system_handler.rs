//! handlers/system_handler.rs
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::services::language_service::LanguageCatalog;

/// GET /api/health
pub async fn health_endpoint() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "IVR Calling System"
    }))
}

/// GET /api/languages
pub async fn languages_endpoint(catalog: web::Data<LanguageCatalog>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "languages": catalog.supported_codes()
    }))
}
