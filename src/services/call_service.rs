//! services/call_service.rs
//! Persistencia de llamadas y de su bitácora (call_logs).

use anyhow::{anyhow, Context, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

use crate::db::{now, parse_db_time, to_db_time};
use crate::models::call_model::{Call, CallLog, CallStats, CallStatus};

const CALL_COLUMNS: &str = "id, campaign_id, phone_number, customer_name, status, \
                            provider_call_ref, language, duration, error_message, \
                            created_at, updated_at";

#[derive(Clone, Debug)]
pub struct CallService {
    db_pool: Pool<Sqlite>,
}

impl CallService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        CallService { db_pool }
    }

    /// Crea la llamada en estado "pending"
    pub async fn create_call(
        &self,
        campaign_id: &str,
        phone_number: &str,
        customer_name: &str,
        language: &str,
    ) -> Result<Call> {
        let ts = now();
        let call = Call {
            id: Uuid::new_v4().to_string(),
            campaign_id: campaign_id.to_string(),
            phone_number: phone_number.to_string(),
            customer_name: customer_name.to_string(),
            status: CallStatus::Pending,
            provider_call_ref: None,
            language: language.to_string(),
            duration: 0,
            error_message: None,
            created_at: ts,
            updated_at: ts,
        };

        sqlx::query(
            r#"
            INSERT INTO calls (
                id, campaign_id, phone_number, customer_name, status,
                provider_call_ref, language, duration, error_message,
                created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, 0, NULL, ?7, ?7)
            "#,
        )
        .bind(&call.id)
        .bind(&call.campaign_id)
        .bind(&call.phone_number)
        .bind(&call.customer_name)
        .bind(call.status.as_str())
        .bind(&call.language)
        .bind(to_db_time(&ts))
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar call")?;

        Ok(call)
    }

    /// El proveedor aceptó la llamada
    pub async fn mark_initiated(&self, call_id: &str, provider_call_ref: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE calls
            SET status = ?2,
                provider_call_ref = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(call_id)
        .bind(CallStatus::Initiated.as_str())
        .bind(provider_call_ref)
        .bind(to_db_time(&now()))
        .execute(&self.db_pool)
        .await
        .context("Fallo al marcar call como initiated")?;

        Ok(())
    }

    /// El proveedor rechazó la llamada
    pub async fn mark_failed(&self, call_id: &str, error_message: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE calls
            SET status = ?2,
                error_message = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(call_id)
        .bind(CallStatus::Failed.as_str())
        .bind(error_message)
        .bind(to_db_time(&now()))
        .execute(&self.db_pool)
        .await
        .context("Fallo al marcar call como failed")?;

        Ok(())
    }

    /// Estado (y duración si viene) reportado por el webhook de estado.
    /// Compare-and-set: sólo escribe si el estado guardado sigue siendo
    /// `expected`. Devuelve `false` si otro callback lo cambió antes.
    pub async fn update_status(
        &self,
        call_id: &str,
        expected: CallStatus,
        status: CallStatus,
        duration: Option<i64>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE calls
            SET status = ?2,
                duration = COALESCE(?3, duration),
                updated_at = ?4
            WHERE id = ?1 AND status = ?5
            "#,
        )
        .bind(call_id)
        .bind(status.as_str())
        .bind(duration)
        .bind(to_db_time(&now()))
        .bind(expected.as_str())
        .execute(&self.db_pool)
        .await
        .context("Fallo al actualizar estado de call")?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn get_call(&self, call_id: &str) -> Result<Option<Call>> {
        let sql = format!("SELECT {CALL_COLUMNS} FROM calls WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(call_id)
            .fetch_optional(&self.db_pool)
            .await
            .context("Fallo al consultar call")?;

        row.as_ref().map(call_from_row).transpose()
    }

    /// Búsqueda por el CallSid de Twilio (indexado)
    pub async fn find_by_provider_ref(&self, provider_call_ref: &str) -> Result<Option<Call>> {
        if provider_call_ref.is_empty() {
            return Ok(None);
        }

        let sql = format!("SELECT {CALL_COLUMNS} FROM calls WHERE provider_call_ref = ?1 LIMIT 1");
        let row = sqlx::query(&sql)
            .bind(provider_call_ref)
            .fetch_optional(&self.db_pool)
            .await
            .context("Fallo al buscar call por provider_call_ref")?;

        row.as_ref().map(call_from_row).transpose()
    }

    pub async fn list_calls_for_campaign(&self, campaign_id: &str) -> Result<Vec<Call>> {
        let sql = format!(
            "SELECT {CALL_COLUMNS} FROM calls WHERE campaign_id = ?1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(campaign_id)
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al listar calls de la campaña")?;

        rows.iter().map(call_from_row).collect()
    }

    /// Conteos por estado
    pub async fn campaign_stats(&self, campaign_id: &str) -> Result<CallStats> {
        let rows = sqlx::query(
            "SELECT status, COUNT(*) AS cnt FROM calls WHERE campaign_id = ?1 GROUP BY status",
        )
        .bind(campaign_id)
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al calcular estadísticas")?;

        let mut stats = CallStats::default();
        for row in rows {
            let status: String = row.try_get("status")?;
            let cnt: i64 = row.try_get("cnt")?;
            stats.total += cnt;
            match CallStatus::parse(&status) {
                Some(CallStatus::Pending) => stats.pending += cnt,
                Some(CallStatus::Initiated) => stats.initiated += cnt,
                Some(CallStatus::InProgress) => stats.in_progress += cnt,
                Some(CallStatus::Completed) => stats.completed += cnt,
                Some(CallStatus::Failed) => stats.failed += cnt,
                None => log::warn!("(campaign_stats) Estado desconocido en DB: {}", status),
            }
        }
        Ok(stats)
    }

    // ----------------------------------------------------------------
    // call_logs (sólo inserción)
    // ----------------------------------------------------------------

    pub async fn append_log(
        &self,
        call_id: &str,
        event: &str,
        details: &str,
        user_input: Option<&str>,
    ) -> Result<CallLog> {
        let entry = CallLog {
            id: Uuid::new_v4().to_string(),
            call_id: call_id.to_string(),
            event: event.to_string(),
            details: details.to_string(),
            user_input: user_input.map(str::to_string),
            created_at: now(),
        };

        sqlx::query(
            r#"
            INSERT INTO call_logs (id, call_id, event, details, user_input, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.call_id)
        .bind(&entry.event)
        .bind(&entry.details)
        .bind(&entry.user_input)
        .bind(to_db_time(&entry.created_at))
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar call_log")?;

        Ok(entry)
    }

    /// Igual que `append_log` pero sin propagar errores: puede fallar en
    /// silencio (sólo queda en el log del proceso).
    pub async fn record_event(
        &self,
        call_id: &str,
        event: &str,
        details: &str,
        user_input: Option<&str>,
    ) {
        if let Err(e) = self.append_log(call_id, event, details, user_input).await {
            log::error!(
                "(record_event) No se pudo registrar '{}' para call {}: {:?}",
                event,
                call_id,
                e
            );
        }
    }

    /// Bitácora de una llamada, la más reciente primero.
    pub async fn list_logs(&self, call_id: &str) -> Result<Vec<CallLog>> {
        let rows = sqlx::query(
            r#"
            SELECT id, call_id, event, details, user_input, created_at
            FROM call_logs
            WHERE call_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(call_id)
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al listar call_logs")?;

        rows.iter().map(call_log_from_row).collect()
    }
}

fn call_from_row(row: &SqliteRow) -> Result<Call> {
    let status_raw: String = row.try_get("status")?;
    let status = CallStatus::parse(&status_raw)
        .ok_or_else(|| anyhow!("Estado de call inválido en DB: {}", status_raw))?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Call {
        id: row.try_get("id")?,
        campaign_id: row.try_get("campaign_id")?,
        phone_number: row.try_get("phone_number")?,
        customer_name: row.try_get("customer_name")?,
        status,
        provider_call_ref: row.try_get("provider_call_ref")?,
        language: row.try_get("language")?,
        duration: row.try_get("duration")?,
        error_message: row.try_get("error_message")?,
        created_at: parse_db_time(&created_at)?,
        updated_at: parse_db_time(&updated_at)?,
    })
}

fn call_log_from_row(row: &SqliteRow) -> Result<CallLog> {
    let created_at: String = row.try_get("created_at")?;

    Ok(CallLog {
        id: row.try_get("id")?,
        call_id: row.try_get("call_id")?,
        event: row.try_get("event")?,
        details: row.try_get("details")?,
        user_input: row.try_get("user_input")?,
        created_at: parse_db_time(&created_at)?,
    })
}
