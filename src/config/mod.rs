//! config/mod.rs
//! Configuración global de la aplicación.

pub mod app_config;
