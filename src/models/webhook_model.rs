//! models/webhook_model.rs
//! Formularios que Twilio envía a nuestros webhooks.

use serde::Deserialize;

/// Query de /api/webhook/voice
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoiceQuery {
    pub call_id: Option<String>,
    pub language: Option<String>,
}

/// Teclas marcadas (gather / optout)
#[derive(Debug, Clone, Deserialize)]
pub struct DigitsInput {
    #[serde(rename = "CallSid", default)]
    pub call_sid: String,
    #[serde(rename = "Digits", default)]
    pub digits: String,
}

/// Callback de estado de la llamada
#[derive(Debug, Clone, Deserialize)]
pub struct StatusCallback {
    #[serde(rename = "CallSid", default)]
    pub call_sid: String,
    #[serde(rename = "CallStatus", default)]
    pub call_status: String,
    #[serde(rename = "CallDuration")]
    pub call_duration: Option<String>,
}
