//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod call_service;
pub mod campaign_service;
pub mod dialer_service;
pub mod language_service;
pub mod twilio_service;
pub mod twiml_service;
pub mod webhook_service;
