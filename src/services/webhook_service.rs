//! services/webhook_service.rs
//! Webhooks de Twilio: entrada de voz, teclas marcadas, opt-out y estado.
//!
//! Ningún webhook devuelve error al proveedor: los fallos de búsqueda o
//! escritura se registran en el log y se responde con el menú por defecto.

use std::sync::Arc;

use crate::models::call_model::{Call, CallStatus};
use crate::models::campaign_model::Campaign;
use crate::models::webhook_model::{DigitsInput, StatusCallback, VoiceQuery};
use crate::services::{
    call_service::CallService,
    campaign_service::CampaignService,
    language_service::LanguageCatalog,
    twiml_service::{select_action, StaticMenuOption, TwimlGenerator},
};

/// Respuesta neutra para el callback de estado
pub const EMPTY_TWIML: &str = "<Response></Response>";

const FALLBACK_LANGUAGE: &str = "en";

const STATUS_WRITE_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct WebhookService {
    call_service: CallService,
    campaign_service: CampaignService,
    catalog: Arc<LanguageCatalog>,
}

impl WebhookService {
    pub fn new(
        call_service: CallService,
        campaign_service: CampaignService,
        catalog: Arc<LanguageCatalog>,
    ) -> Self {
        Self {
            call_service,
            campaign_service,
            catalog,
        }
    }

    /// POST /api/webhook/voice: saludo inicial
    pub async fn on_voice(&self, query: VoiceQuery) -> String {
        let call = match query.call_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => self.lookup_call(id).await,
            _ => None,
        };

        let language = query
            .language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .or_else(|| call.as_ref().map(|c| c.language.clone()))
            .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string());
        let generator = TwimlGenerator::new(&self.catalog, &language);

        let customer_name = call.as_ref().map(|c| c.customer_name.as_str()).unwrap_or("");
        match self.dynamic_campaign_for(call.as_ref()).await {
            Some(campaign) => {
                log::info!(
                    "(on_voice) Menú dinámico campaña '{}' ({} acciones)",
                    campaign.name,
                    campaign.actions.len()
                );
                generator.dynamic_welcome(customer_name, &campaign)
            }
            None => {
                log::info!("(on_voice) Menú estático, call_id={:?}", query.call_id);
                generator.welcome(customer_name)
            }
        }
    }

    /// POST /api/webhook/gather: el usuario marcó una tecla
    pub async fn on_digits(&self, input: DigitsInput) -> String {
        let digits = input.digits.trim();
        let call = self.lookup_call_by_ref(&input.call_sid).await;

        let language = call
            .as_ref()
            .map(|c| c.language.as_str())
            .unwrap_or(FALLBACK_LANGUAGE);
        let generator = TwimlGenerator::new(&self.catalog, language);

        if let Some(call) = &call {
            self.call_service
                .record_event(
                    &call.id,
                    "input_received",
                    &format!("User pressed: {}", digits),
                    Some(digits),
                )
                .await;
        }

        if let Some(campaign) = self.dynamic_campaign_for(call.as_ref()).await {
            return match select_action(digits, &campaign) {
                Some(action) => {
                    if let Some(call) = &call {
                        self.call_service
                            .record_event(
                                &call.id,
                                &format!("action_{}_executed", action.action_type.as_str()),
                                &format!(
                                    "User pressed {} - Action type: {}",
                                    digits,
                                    action.action_type.as_str()
                                ),
                                Some(digits),
                            )
                            .await;
                    }
                    generator.dynamic_response(action, &campaign)
                }
                // 0, sin acciones o sin coincidencia: repetir el menú
                None => generator.dynamic_welcome("", &campaign),
            };
        }

        let option = StaticMenuOption::from_digits(digits);
        if let (Some(call), Some((event, details))) = (&call, option.log_event()) {
            self.call_service
                .record_event(&call.id, event, details, Some(digits))
                .await;
        }
        generator.static_response(option)
    }

    /// POST /api/webhook/optout: "1" confirma la baja
    pub async fn on_opt_out(&self, input: DigitsInput) -> String {
        let digits = input.digits.trim();
        let call = self.lookup_call_by_ref(&input.call_sid).await;

        let language = call
            .as_ref()
            .map(|c| c.language.as_str())
            .unwrap_or(FALLBACK_LANGUAGE);
        let generator = TwimlGenerator::new(&self.catalog, language);

        if digits == "1" {
            if let Some(call) = &call {
                self.call_service
                    .record_event(&call.id, "opted_out", "User confirmed opt-out", Some(digits))
                    .await;
            }
            generator.opt_out_confirm()
        } else {
            generator.main_menu()
        }
    }

    /// POST /api/webhook/status: siempre se reconoce, pase lo que pase.
    pub async fn on_status(&self, update: StatusCallback) {
        let Some(call) = self.lookup_call_by_ref(&update.call_sid).await else {
            log::warn!(
                "(on_status) No hay llamada para CallSid='{}' (status={})",
                update.call_sid,
                update.call_status
            );
            return;
        };

        let provider_status = update.call_status.trim();
        let mapped = CallStatus::from_provider(provider_status);
        let duration = update.call_duration.as_deref().and_then(parse_duration);

        self.apply_status(&call, mapped, duration, provider_status).await;

        self.call_service
            .record_event(
                &call.id,
                provider_status,
                &format!("Call status: {}", provider_status),
                None,
            )
            .await;
    }

    /// Aplica el estado del proveedor sobre el último estado guardado.
    /// Si otro callback escribió entre la lectura y la escritura, se relee
    /// y se vuelve a aplicar la transición.
    async fn apply_status(
        &self,
        call: &Call,
        mapped: Option<CallStatus>,
        duration: Option<i64>,
        provider_status: &str,
    ) {
        let mut current = call.status;

        for _ in 0..STATUS_WRITE_ATTEMPTS {
            let next = mapped.map_or(current, |m| current.apply(m));

            match self
                .call_service
                .update_status(&call.id, current, next, duration)
                .await
            {
                Ok(true) => {
                    if next != current {
                        log::info!(
                            "(on_status) Call {}: {} -> {} (proveedor: {})",
                            call.id,
                            current.as_str(),
                            next.as_str(),
                            provider_status
                        );
                    }
                    return;
                }
                Ok(false) => match self.lookup_call(&call.id).await {
                    Some(latest) => current = latest.status,
                    None => return,
                },
                Err(e) => {
                    log::error!("(on_status) No se pudo actualizar call {}: {:?}", call.id, e);
                    return;
                }
            }
        }

        log::warn!(
            "(on_status) Call {}: estado '{}' descartado tras {} intentos concurrentes",
            call.id,
            provider_status,
            STATUS_WRITE_ATTEMPTS
        );
    }

    // ----------------------------------------------------------------
    // Búsquedas best-effort
    // ----------------------------------------------------------------

    async fn lookup_call(&self, call_id: &str) -> Option<Call> {
        match self.call_service.get_call(call_id).await {
            Ok(call) => call,
            Err(e) => {
                log::warn!("(lookup_call) Error buscando call {}: {:?}", call_id, e);
                None
            }
        }
    }

    async fn lookup_call_by_ref(&self, provider_call_ref: &str) -> Option<Call> {
        let provider_call_ref = provider_call_ref.trim();
        match self.call_service.find_by_provider_ref(provider_call_ref).await {
            Ok(call) => call,
            Err(e) => {
                log::warn!(
                    "(lookup_call_by_ref) Error buscando CallSid {}: {:?}",
                    provider_call_ref,
                    e
                );
                None
            }
        }
    }

    /// Campaña de la llamada, sólo si tiene contenido para el menú dinámico.
    async fn dynamic_campaign_for(&self, call: Option<&Call>) -> Option<Campaign> {
        let call = call?;
        match self.campaign_service.get_campaign(&call.campaign_id).await {
            Ok(campaign) => campaign.filter(Campaign::has_ivr_content),
            Err(e) => {
                log::warn!(
                    "(dynamic_campaign_for) Error buscando campaña {}: {:?}",
                    call.campaign_id,
                    e
                );
                None
            }
        }
    }
}

/// Segundos no negativos; cualquier otra cosa se ignora.
fn parse_duration(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|d| *d >= 0)
}
