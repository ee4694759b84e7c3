//! services/dialer_service.rs
//! Llamadas masivas: una llamada por contacto, sin abortar el lote por fallos individuales.

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;

use crate::error::{parse_id, ServiceError, ServiceResult};
use crate::models::call_model::{BulkCallRequest, BulkCallResponse, Contact};
use crate::models::campaign_model::Campaign;
use crate::services::{
    call_service::CallService,
    campaign_service::CampaignService,
    twilio_service::{OutboundCall, TelephonyClient},
};

#[derive(Clone)]
pub struct DialerService {
    campaign_service: CampaignService,
    call_service: CallService,
    telephony: Arc<dyn TelephonyClient>,
    webhook_base_url: String,
    default_language: String,
    provider_timeout: Duration,
}

impl DialerService {
    pub fn new(
        campaign_service: CampaignService,
        call_service: CallService,
        telephony: Arc<dyn TelephonyClient>,
        webhook_base_url: String,
        default_language: String,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            campaign_service,
            call_service,
            telephony,
            webhook_base_url: webhook_base_url.trim_end_matches('/').to_string(),
            default_language,
            provider_timeout,
        }
    }

    /// Valida el lote y la campaña antes de escribir nada; luego procesa
    /// los contactos en orden. Una vez pasada la validación nunca falla.
    pub async fn initiate_bulk(&self, req: BulkCallRequest) -> ServiceResult<BulkCallResponse> {
        let campaign_id = parse_id(&req.campaign_id, "campaign")?;
        validate_contacts(&req.contacts)?;

        let campaign = self.campaign_service.require_campaign(&campaign_id).await?;
        if !campaign.is_active {
            return Err(ServiceError::PreconditionFailed(
                "Campaign is not active".to_string(),
            ));
        }

        let language = self.resolve_language(req.language.as_deref(), &campaign);

        log::info!(
            "(initiate_bulk) Campaña {} ('{}'), {} contactos, idioma={}",
            campaign.id,
            campaign.name,
            req.contacts.len(),
            language
        );

        let mut success_count = 0;
        let mut fail_count = 0;
        let mut call_ids = Vec::with_capacity(req.contacts.len());

        for contact in &req.contacts {
            match self.dial_contact(&campaign, contact, &language).await {
                Some((call_id, true)) => {
                    call_ids.push(call_id);
                    success_count += 1;
                }
                Some((call_id, false)) => {
                    call_ids.push(call_id);
                    fail_count += 1;
                }
                None => fail_count += 1,
            }
        }

        log::info!(
            "(initiate_bulk) Finalizado: {} exitosas, {} fallidas",
            success_count,
            fail_count
        );

        Ok(BulkCallResponse {
            message: "Bulk calls initiated".to_string(),
            success_count,
            fail_count,
            call_ids,
        })
    }

    /// override -> idioma de la campaña -> idioma por defecto
    pub fn resolve_language(&self, language_override: Option<&str>, campaign: &Campaign) -> String {
        [language_override.unwrap_or_default(), campaign.language.as_str()]
            .into_iter()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or(self.default_language.as_str())
            .to_string()
    }

    /// Procesa un contacto. Devuelve (call_id, éxito) o `None` si ni
    /// siquiera se pudo crear el registro de la llamada.
    async fn dial_contact(
        &self,
        campaign: &Campaign,
        contact: &Contact,
        language: &str,
    ) -> Option<(String, bool)> {
        let phone_number = contact.phone_number.trim();

        // 1) Registro en "pending"
        let call = match self
            .call_service
            .create_call(&campaign.id, phone_number, contact.name.trim(), language)
            .await
        {
            Ok(call) => call,
            Err(e) => {
                log::error!(
                    "(dial_contact) No se pudo crear la llamada para {}: {:?}",
                    phone_number,
                    e
                );
                return None;
            }
        };

        // 2) Pedir la llamada al proveedor
        let outbound = OutboundCall {
            to: phone_number.to_string(),
            voice_url: self.voice_url(&call.id, language),
            status_callback_url: self.status_callback_url(),
        };
        let placed = match tokio::time::timeout(
            self.provider_timeout,
            self.telephony.place_call(&outbound),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(anyhow!(
                "Telephony provider timed out after {:?}",
                self.provider_timeout
            )),
        };

        match placed {
            Ok(provider_call_ref) => {
                // 4) initiated + referencia del proveedor
                if let Err(e) = self
                    .call_service
                    .mark_initiated(&call.id, &provider_call_ref)
                    .await
                {
                    log::error!("(dial_contact) No se pudo marcar initiated {}: {:?}", call.id, e);
                }
                self.call_service
                    .record_event(
                        &call.id,
                        "initiated",
                        &format!("Call initiated to {}", phone_number),
                        None,
                    )
                    .await;
                Some((call.id, true))
            }
            Err(e) => {
                // 3) failed + mensaje de error, el lote sigue
                let error = e.to_string();
                log::error!(
                    "(dial_contact) Falló la llamada a {} (call {}): {}",
                    phone_number,
                    call.id,
                    error
                );
                if let Err(e) = self.call_service.mark_failed(&call.id, &error).await {
                    log::error!("(dial_contact) No se pudo marcar failed {}: {:?}", call.id, e);
                }
                self.call_service
                    .record_event(
                        &call.id,
                        "failed",
                        &format!("Failed to initiate call to {}: {}", phone_number, error),
                        None,
                    )
                    .await;
                Some((call.id, false))
            }
        }
    }

    pub fn voice_url(&self, call_id: &str, language: &str) -> String {
        format!(
            "{}/api/webhook/voice?call_id={}&language={}",
            self.webhook_base_url,
            urlencoding::encode(call_id),
            urlencoding::encode(language)
        )
    }

    pub fn status_callback_url(&self) -> String {
        format!("{}/api/webhook/status", self.webhook_base_url)
    }
}

fn validate_contacts(contacts: &[Contact]) -> ServiceResult<()> {
    if contacts.is_empty() {
        return Err(ServiceError::validation("At least one contact is required"));
    }
    if let Some(pos) = contacts
        .iter()
        .position(|c| c.phone_number.trim().is_empty())
    {
        return Err(ServiceError::validation(format!(
            "Contact {} is missing phone_number",
            pos + 1
        )));
    }
    Ok(())
}
