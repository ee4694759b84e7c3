//! config/app_config.rs
//! Configuración leída desde variables de entorno (con `.env` vía dotenv).

use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub default_language: String, // último recurso al resolver idioma
    pub webhook_base_url: String, // URL pública con la que Twilio nos llama
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_phone_number: String,
    pub twilio_api_base: String,
    pub provider_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            port: 8080,
            database_url: "sqlite:data/ivr_calls.db".to_string(),
            default_language: "en".to_string(),
            webhook_base_url: "http://localhost:8080".to_string(),
            twilio_account_sid: String::new(),
            twilio_auth_token: String::new(),
            twilio_phone_number: String::new(),
            twilio_api_base: "https://api.twilio.com/2010-04-01".to_string(),
            provider_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// Lee la configuración del entorno. Las variables vacías o ausentes
    /// conservan el valor por defecto.
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();

        AppConfig {
            port: env_parse("PORT", defaults.port),
            database_url: env_or("DATABASE_URL", defaults.database_url),
            default_language: env_or("DEFAULT_LANGUAGE", defaults.default_language),
            webhook_base_url: env_or("WEBHOOK_BASE_URL", defaults.webhook_base_url)
                .trim_end_matches('/')
                .to_string(),
            twilio_account_sid: env_or("TWILIO_ACCOUNT_SID", defaults.twilio_account_sid),
            twilio_auth_token: env_or("TWILIO_AUTH_TOKEN", defaults.twilio_auth_token),
            twilio_phone_number: env_or("TWILIO_PHONE_NUMBER", defaults.twilio_phone_number),
            twilio_api_base: env_or("TWILIO_API_BASE", defaults.twilio_api_base)
                .trim_end_matches('/')
                .to_string(),
            provider_timeout_secs: env_parse("PROVIDER_TIMEOUT_SECS", defaults.provider_timeout_secs),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default,
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(v) => v.trim().parse().unwrap_or_else(|_| {
            log::warn!("Valor inválido para {}='{}', usando el default", key, v);
            default
        }),
        Err(_) => default,
    }
}
