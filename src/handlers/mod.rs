//! handlers/mod.rs
//! Módulo que agrupa los distintos handlers (campañas, llamadas, webhooks, sistema).
pub mod call_handler;
pub mod campaign_handler;
pub mod system_handler;
pub mod webhook_handler;
