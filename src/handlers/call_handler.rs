//! handlers/call_handler.rs
use actix_web::{web, HttpResponse, ResponseError};

use crate::error::{parse_id, ServiceError};
use crate::models::call_model::{BulkCallRequest, CallDetailsResponse};
use crate::services::call_service::CallService;
use crate::services::dialer_service::DialerService;

/// POST /api/calls/bulk
pub async fn bulk_calls_endpoint(
    dialer_service: web::Data<DialerService>,
    body: web::Json<BulkCallRequest>,
) -> HttpResponse {
    match dialer_service.initiate_bulk(body.into_inner()).await {
        Ok(resp) => HttpResponse::Ok().json(resp),
        Err(e) => {
            log::warn!("Bulk call rechazado: {}", e);
            e.error_response()
        }
    }
}

/// GET /api/calls/{id}
/// La llamada junto con su bitácora (más reciente primero).
pub async fn get_call_endpoint(
    call_service: web::Data<CallService>,
    path: web::Path<String>,
) -> HttpResponse {
    let call_id = match parse_id(&path.into_inner(), "call") {
        Ok(id) => id,
        Err(e) => return e.error_response(),
    };

    let call = match call_service.get_call(&call_id).await {
        Ok(Some(call)) => call,
        Ok(None) => return ServiceError::not_found("Call not found").error_response(),
        Err(e) => return ServiceError::Internal(e).error_response(),
    };

    match call_service.list_logs(&call_id).await {
        Ok(call_logs) => HttpResponse::Ok().json(CallDetailsResponse { call, call_logs }),
        Err(e) => ServiceError::Internal(e).error_response(),
    }
}
