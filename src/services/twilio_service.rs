//! services/twilio_service.rs
//! Cliente del proveedor de telefonía (API REST de Twilio).

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::app_config::AppConfig;

/// Eventos de estado que pedimos a Twilio que nos notifique.
const STATUS_CALLBACK_EVENTS: [&str; 4] = ["initiated", "ringing", "answered", "completed"];

/// Datos para colocar una llamada saliente.
#[derive(Debug, Clone)]
pub struct OutboundCall {
    pub to: String,
    /// URL que Twilio consulta para obtener el TwiML inicial
    pub voice_url: String,
    pub status_callback_url: String,
}

/// "Colocar llamada saliente" -> referencia de la llamada en el proveedor.
#[async_trait]
pub trait TelephonyClient: Send + Sync {
    async fn place_call(&self, call: &OutboundCall) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct TwilioCallResponse {
    sid: String,
}

#[derive(Clone)]
pub struct TwilioService {
    http_client: Client,
    api_base: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.provider_timeout_secs))
            .build()
            .context("No se pudo construir el cliente HTTP de Twilio")?;

        Ok(Self {
            http_client,
            api_base: config.twilio_api_base.clone(),
            account_sid: config.twilio_account_sid.clone(),
            auth_token: config.twilio_auth_token.clone(),
            from_number: config.twilio_phone_number.clone(),
        })
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.account_sid.is_empty() || self.auth_token.is_empty() {
            return Err(anyhow!("Twilio credentials not configured"));
        }
        if self.from_number.is_empty() {
            return Err(anyhow!("Twilio phone number not configured"));
        }
        Ok(())
    }
}

#[async_trait]
impl TelephonyClient for TwilioService {
    async fn place_call(&self, call: &OutboundCall) -> Result<String> {
        self.ensure_configured()?;

        let api_url = format!("{}/Accounts/{}/Calls.json", self.api_base, self.account_sid);

        log::info!(
            "(place_call) To={}, From={}, Url={}, StatusCallback={}",
            call.to,
            self.from_number,
            call.voice_url,
            call.status_callback_url
        );

        let mut form: Vec<(&str, &str)> = vec![
            ("To", call.to.as_str()),
            ("From", self.from_number.as_str()),
            ("Url", call.voice_url.as_str()),
            ("Method", "POST"),
            ("StatusCallback", call.status_callback_url.as_str()),
            ("StatusCallbackMethod", "POST"),
        ];
        for event in STATUS_CALLBACK_EVENTS {
            form.push(("StatusCallbackEvent", event));
        }

        let resp = self
            .http_client
            .post(&api_url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .context("Fallo al llamar a la API de Twilio")?;

        let status = resp.status();
        if !status.is_success() {
            let body_txt = resp.text().await.unwrap_or_default();
            log::error!("(place_call) Twilio respondió {}: {}", status, body_txt);
            return Err(anyhow!("Twilio API error (status {}): {}", status.as_u16(), body_txt));
        }

        let parsed = resp
            .json::<TwilioCallResponse>()
            .await
            .context("No se pudo interpretar la respuesta de Twilio")?;

        log::info!("(place_call) Llamada creada en Twilio SID={}", parsed.sid);
        Ok(parsed.sid)
    }
}
