//! logger.rs
//! Logger del servicio (env_logger sobre la fachada `log`).

use env_logger::{Builder, Env};

/// Filtro por defecto si RUST_LOG no está definido. sqlx registra cada
/// consulta en nivel info y cada webhook dispara varias.
const DEFAULT_FILTER: &str = "info,sqlx::query=warn";

pub fn init_logger() {
    builder().format_timestamp_secs().init();
}

/// Logger para tests: captura la salida por test y tolera inicializarse
/// más de una vez.
#[cfg(test)]
pub fn init_test_logger() {
    let _ = builder().is_test(true).try_init();
}

fn builder() -> Builder {
    Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
}
