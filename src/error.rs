//! error.rs
//! Errores visibles para el cliente de la API.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Id mal formado o campo requerido ausente
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// p.ej. campaña inactiva al iniciar llamadas
    #[error("{0}")]
    PreconditionFailed(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ServiceError::NotFound(msg.into())
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) | ServiceError::PreconditionFailed(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::Internal(e) => {
                log::error!("Internal error: {:?}", e);
                HttpResponse::InternalServerError().json(json!({
                    "error": "Internal server error",
                    "details": format!("{}", e)
                }))
            }
            other => HttpResponse::build(other.status_code()).json(json!({
                "error": other.to_string()
            })),
        }
    }
}

/// Valida que `raw` sea un UUID y lo devuelve normalizado.
pub fn parse_id(raw: &str, what: &str) -> ServiceResult<String> {
    uuid::Uuid::parse_str(raw.trim())
        .map(|id| id.to_string())
        .map_err(|_| ServiceError::validation(format!("Invalid {} ID", what)))
}
