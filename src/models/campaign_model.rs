//! models/campaign_model.rs
//! Campañas y su menú IVR dinámico.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Information,
    Forward,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Information => "information",
            ActionType::Forward => "forward",
        }
    }
}

/// Una opción del menú: tecla -> acción.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IvrAction {
    pub action_type: ActionType,
    /// Tecla (o código corto) que selecciona la acción
    pub action_input: String,
    /// information: texto o URL http(s) de audio. forward: mensaje previo opcional.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub forward_phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub description: String,
    pub language: String,
    pub intro_text: String,
    pub actions: Vec<IvrAction>, // el orden de inserción es el orden del menú
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Una campaña con intro o acciones usa el menú dinámico.
    pub fn has_ivr_content(&self) -> bool {
        !self.intro_text.is_empty() || !self.actions.is_empty()
    }
}

/// POST /api/campaigns
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub intro_text: String,
    #[serde(default)]
    pub actions: Vec<IvrAction>,
    #[serde(default)]
    pub is_active: bool,
}

/// PUT /api/campaigns/{id}: sólo se tocan los campos presentes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCampaignRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub intro_text: Option<String>,
    pub actions: Option<Vec<IvrAction>>,
    pub is_active: Option<bool>,
}
