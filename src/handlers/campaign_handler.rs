//! handlers/campaign_handler.rs
use actix_web::{web, HttpResponse, ResponseError};
use serde_json::json;

use crate::error::parse_id;
use crate::models::call_model::CampaignCallsResponse;
use crate::models::campaign_model::{CreateCampaignRequest, UpdateCampaignRequest};
use crate::services::call_service::CallService;
use crate::services::campaign_service::CampaignService;

/// POST /api/campaigns
pub async fn create_campaign_endpoint(
    campaign_service: web::Data<CampaignService>,
    body: web::Json<CreateCampaignRequest>,
) -> HttpResponse {
    match campaign_service.create_campaign(body.into_inner()).await {
        Ok(campaign) => HttpResponse::Created().json(campaign),
        Err(e) => e.error_response(),
    }
}

/// GET /api/campaigns
pub async fn list_campaigns_endpoint(campaign_service: web::Data<CampaignService>) -> HttpResponse {
    match campaign_service.list_campaigns().await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": "Failed to retrieve campaigns",
            "details": format!("{:?}", e)
        })),
    }
}

/// GET /api/campaigns/{id}
pub async fn get_campaign_endpoint(
    campaign_service: web::Data<CampaignService>,
    path: web::Path<String>,
) -> HttpResponse {
    let campaign_id = match parse_id(&path.into_inner(), "campaign") {
        Ok(id) => id,
        Err(e) => return e.error_response(),
    };

    match campaign_service.require_campaign(&campaign_id).await {
        Ok(campaign) => HttpResponse::Ok().json(campaign),
        Err(e) => e.error_response(),
    }
}

/// PUT /api/campaigns/{id}
pub async fn update_campaign_endpoint(
    campaign_service: web::Data<CampaignService>,
    path: web::Path<String>,
    body: web::Json<UpdateCampaignRequest>,
) -> HttpResponse {
    let campaign_id = match parse_id(&path.into_inner(), "campaign") {
        Ok(id) => id,
        Err(e) => return e.error_response(),
    };

    match campaign_service
        .update_campaign(&campaign_id, body.into_inner())
        .await
    {
        Ok(campaign) => HttpResponse::Ok().json(campaign),
        Err(e) => e.error_response(),
    }
}

/// DELETE /api/campaigns/{id}
pub async fn delete_campaign_endpoint(
    campaign_service: web::Data<CampaignService>,
    path: web::Path<String>,
) -> HttpResponse {
    let campaign_id = match parse_id(&path.into_inner(), "campaign") {
        Ok(id) => id,
        Err(e) => return e.error_response(),
    };

    match campaign_service.delete_campaign(&campaign_id).await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "message": "Campaign deleted successfully"
        })),
        Err(e) => e.error_response(),
    }
}

/// GET /api/campaigns/{id}/calls
/// Llamadas de la campaña más conteos por estado.
pub async fn campaign_calls_endpoint(
    campaign_service: web::Data<CampaignService>,
    call_service: web::Data<CallService>,
    path: web::Path<String>,
) -> HttpResponse {
    let campaign_id = match parse_id(&path.into_inner(), "campaign") {
        Ok(id) => id,
        Err(e) => return e.error_response(),
    };

    if let Err(e) = campaign_service.require_campaign(&campaign_id).await {
        return e.error_response();
    }

    let calls = match call_service.list_calls_for_campaign(&campaign_id).await {
        Ok(calls) => calls,
        Err(e) => {
            return HttpResponse::InternalServerError().json(json!({
                "error": "Failed to retrieve calls",
                "details": format!("{:?}", e)
            }))
        }
    };

    match call_service.campaign_stats(&campaign_id).await {
        Ok(stats) => HttpResponse::Ok().json(CampaignCallsResponse { calls, stats }),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": "Failed to compute call statistics",
            "details": format!("{:?}", e)
        })),
    }
}
