//! models/call_model.rs
//! Llamadas individuales, su bitácora y los payloads de llamadas masivas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "initiated")]
    Initiated,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "failed")]
    Failed,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Pending => "pending",
            CallStatus::Initiated => "initiated",
            CallStatus::InProgress => "in-progress",
            CallStatus::Completed => "completed",
            CallStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(CallStatus::Pending),
            "initiated" => Some(CallStatus::Initiated),
            "in-progress" => Some(CallStatus::InProgress),
            "completed" => Some(CallStatus::Completed),
            "failed" => Some(CallStatus::Failed),
            _ => None,
        }
    }

    /// Vocabulario de estados de Twilio -> estado interno.
    /// `None` para estados que no cambian nada.
    pub fn from_provider(provider_status: &str) -> Option<Self> {
        match provider_status {
            "queued" | "ringing" => Some(CallStatus::Initiated),
            "in-progress" => Some(CallStatus::InProgress),
            "completed" => Some(CallStatus::Completed),
            "failed" | "busy" | "no-answer" => Some(CallStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CallStatus::Completed | CallStatus::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            CallStatus::Pending => 0,
            CallStatus::Initiated => 1,
            CallStatus::InProgress => 2,
            CallStatus::Completed | CallStatus::Failed => 3,
        }
    }

    /// Estado resultante de aplicar `next` sobre `self`.
    /// Los terminales no se abandonan y los no terminales no retroceden.
    pub fn apply(self, next: CallStatus) -> CallStatus {
        if self.is_terminal() || next.rank() < self.rank() {
            self
        } else {
            next
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Call {
    pub id: String,
    pub campaign_id: String,
    pub phone_number: String,
    pub customer_name: String,
    pub status: CallStatus,
    pub provider_call_ref: Option<String>,
    pub language: String,
    pub duration: i64, // segundos
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Evento inmutable de una llamada.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallLog {
    pub id: String,
    pub call_id: String,
    pub event: String, // initiated, input_received, action_forward_executed, opted_out, ...
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_input: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    pub phone_number: String,
    #[serde(default)]
    pub name: String,
}

/// POST /api/calls/bulk
#[derive(Debug, Clone, Deserialize)]
pub struct BulkCallRequest {
    pub campaign_id: String,
    #[serde(default)]
    pub language: Option<String>,
    pub contacts: Vec<Contact>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkCallResponse {
    pub message: String,
    pub success_count: usize,
    pub fail_count: usize,
    pub call_ids: Vec<String>,
}

/// Conteos por estado para una campaña
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallStats {
    pub total: i64,
    pub pending: i64,
    pub initiated: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub failed: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignCallsResponse {
    pub calls: Vec<Call>,
    pub stats: CallStats,
}

/// GET /api/calls/{id}
#[derive(Debug, Clone, Serialize)]
pub struct CallDetailsResponse {
    #[serde(flatten)]
    pub call: Call,
    pub call_logs: Vec<CallLog>,
}
