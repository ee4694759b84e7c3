//! db.rs
//! Pool de SQLite y migraciones.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

/// Ninguna operación de base de datos espera más que esto.
pub const STORE_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn connect(database_url: &str) -> Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("DATABASE_URL inválida: {}", database_url))?
        .create_if_missing(true)
        .busy_timeout(STORE_TIMEOUT);

    // Crear la carpeta del archivo (p.ej. "data/") si no existe
    if let Some(parent) = database_dir(database_url) {
        std::fs::create_dir_all(&parent)
            .with_context(|| format!("No se pudo crear directorio {:?}", parent))?;
    }

    log::info!("Conectando a SQLite en {}", database_url);

    let pool = SqlitePoolOptions::new()
        .acquire_timeout(STORE_TIMEOUT)
        .connect_with(options)
        .await
        .context("No se pudo conectar a la base de datos SQLite")?;

    Ok(pool)
}

fn database_dir(database_url: &str) -> Option<PathBuf> {
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// Base en memoria para tests: una sola conexión que nunca se recicla,
/// si no cada conexión vería una base distinta.
#[cfg(test)]
pub async fn connect_in_memory() -> Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .acquire_timeout(STORE_TIMEOUT)
        .connect_with(options)
        .await
        .context("No se pudo abrir SQLite en memoria")?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Corre migraciones con sqlx
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Fallo en migraciones")?;
    Ok(())
}

/// Marca de tiempo truncada a microsegundos, igual a como queda guardada.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Ancho fijo: el orden lexicográfico coincide con el cronológico.
pub fn to_db_time(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_db_time(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .with_context(|| format!("Fecha inválida en DB: {}", raw))
}
