//! services/campaign_service.rs
//! CRUD de campañas sobre SQLite.

use std::collections::HashSet;

use anyhow::{Context, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

use crate::db::{now, parse_db_time, to_db_time};
use crate::error::{ServiceError, ServiceResult};
use crate::models::campaign_model::{
    ActionType, Campaign, CreateCampaignRequest, IvrAction, UpdateCampaignRequest,
};
use crate::services::twiml_service::REPEAT_DIGIT;

const CAMPAIGN_COLUMNS: &str = "id, name, description, language, intro_text, actions, \
                                is_active, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct CampaignService {
    db_pool: Pool<Sqlite>,
    default_language: String,
}

impl CampaignService {
    pub fn new(db_pool: Pool<Sqlite>, default_language: String) -> Self {
        CampaignService {
            db_pool,
            default_language,
        }
    }

    pub async fn create_campaign(&self, req: CreateCampaignRequest) -> ServiceResult<Campaign> {
        let language = req
            .language
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.default_language.clone());

        let ts = now();
        let campaign = Campaign {
            id: Uuid::new_v4().to_string(),
            name: req.name.trim().to_string(),
            description: req.description.trim().to_string(),
            language,
            intro_text: req.intro_text,
            actions: req.actions,
            is_active: req.is_active,
            created_at: ts,
            updated_at: ts,
        };
        validate_campaign(&campaign)?;

        log::info!(
            "(create_campaign) name='{}', language={}, actions={}",
            campaign.name,
            campaign.language,
            campaign.actions.len()
        );

        let actions_json =
            serde_json::to_string(&campaign.actions).context("No se pudo serializar actions")?;
        let created = to_db_time(&campaign.created_at);

        sqlx::query(
            r#"
            INSERT INTO campaigns (
                id, name, description, language, intro_text, actions,
                is_active, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            "#,
        )
        .bind(&campaign.id)
        .bind(&campaign.name)
        .bind(&campaign.description)
        .bind(&campaign.language)
        .bind(&campaign.intro_text)
        .bind(actions_json)
        .bind(campaign.is_active)
        .bind(created)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar campaign")?;

        log::info!("(create_campaign) Campaña creada con ID={}", campaign.id);
        Ok(campaign)
    }

    pub async fn get_campaign(&self, campaign_id: &str) -> Result<Option<Campaign>> {
        let sql = format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(campaign_id)
            .fetch_optional(&self.db_pool)
            .await
            .context("Fallo al consultar campaign")?;

        row.as_ref().map(campaign_from_row).transpose()
    }

    /// Igual que `get_campaign` pero con NotFound si no existe.
    pub async fn require_campaign(&self, campaign_id: &str) -> ServiceResult<Campaign> {
        self.get_campaign(campaign_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Campaign not found"))
    }

    pub async fn list_campaigns(&self) -> Result<Vec<Campaign>> {
        let sql = format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns ORDER BY created_at DESC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al listar campaigns")?;

        rows.iter().map(campaign_from_row).collect()
    }

    pub async fn update_campaign(
        &self,
        campaign_id: &str,
        req: UpdateCampaignRequest,
    ) -> ServiceResult<Campaign> {
        let mut campaign = self.require_campaign(campaign_id).await?;

        if let Some(name) = req.name {
            campaign.name = name.trim().to_string();
        }
        if let Some(description) = req.description {
            campaign.description = description.trim().to_string();
        }
        if let Some(language) = req.language {
            let language = language.trim().to_string();
            campaign.language = if language.is_empty() {
                self.default_language.clone()
            } else {
                language
            };
        }
        if let Some(intro_text) = req.intro_text {
            campaign.intro_text = intro_text;
        }
        if let Some(actions) = req.actions {
            campaign.actions = actions;
        }
        if let Some(is_active) = req.is_active {
            campaign.is_active = is_active;
        }
        campaign.updated_at = now();
        validate_campaign(&campaign)?;

        let actions_json =
            serde_json::to_string(&campaign.actions).context("No se pudo serializar actions")?;

        let result = sqlx::query(
            r#"
            UPDATE campaigns
            SET name = ?2,
                description = ?3,
                language = ?4,
                intro_text = ?5,
                actions = ?6,
                is_active = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&campaign.id)
        .bind(&campaign.name)
        .bind(&campaign.description)
        .bind(&campaign.language)
        .bind(&campaign.intro_text)
        .bind(actions_json)
        .bind(campaign.is_active)
        .bind(to_db_time(&campaign.updated_at))
        .execute(&self.db_pool)
        .await
        .context("Fallo al actualizar campaign")?;

        // Borrada entre la lectura y la escritura
        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("Campaign not found"));
        }

        log::info!("(update_campaign) Campaña {} actualizada", campaign.id);
        Ok(campaign)
    }

    /// Las llamadas de la campaña se conservan como histórico.
    pub async fn delete_campaign(&self, campaign_id: &str) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = ?1")
            .bind(campaign_id)
            .execute(&self.db_pool)
            .await
            .context("Fallo al borrar campaign")?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("Campaign not found"));
        }

        log::info!("(delete_campaign) Campaña {} eliminada", campaign_id);
        Ok(())
    }
}

/// Reglas de escritura: nombre y descripción obligatorios, teclas únicas,
/// la tecla 0 reservada y forward con número destino.
pub fn validate_campaign(campaign: &Campaign) -> ServiceResult<()> {
    if campaign.name.is_empty() {
        return Err(ServiceError::validation("Campaign name is required"));
    }
    if campaign.description.is_empty() {
        return Err(ServiceError::validation("Description is required"));
    }
    validate_actions(&campaign.actions)
}

fn validate_actions(actions: &[IvrAction]) -> ServiceResult<()> {
    let mut seen = HashSet::new();

    for (i, action) in actions.iter().enumerate() {
        let input = action.action_input.trim();
        if input.is_empty() {
            return Err(ServiceError::validation(format!(
                "Action {} is missing action_input",
                i + 1
            )));
        }
        if input != action.action_input {
            return Err(ServiceError::validation(format!(
                "Action {} action_input must not contain whitespace",
                i + 1
            )));
        }
        if input == REPEAT_DIGIT {
            return Err(ServiceError::validation(format!(
                "Action {} uses input {}, which is reserved for repeating the menu",
                i + 1,
                REPEAT_DIGIT
            )));
        }
        if action.action_type == ActionType::Forward && action.forward_phone.trim().is_empty() {
            return Err(ServiceError::validation(format!(
                "Action {} is a forward action and requires forward_phone",
                i + 1
            )));
        }
        if !seen.insert(input) {
            return Err(ServiceError::validation(format!(
                "Duplicate action_input '{}'",
                input
            )));
        }
    }

    Ok(())
}

fn campaign_from_row(row: &SqliteRow) -> Result<Campaign> {
    let actions_raw: String = row.try_get("actions")?;
    let actions: Vec<IvrAction> =
        serde_json::from_str(&actions_raw).context("actions inválidas en DB")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Campaign {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        language: row.try_get("language")?,
        intro_text: row.try_get("intro_text")?,
        actions,
        is_active: row.try_get::<i64, _>("is_active")? != 0,
        created_at: parse_db_time(&created_at)?,
        updated_at: parse_db_time(&updated_at)?,
    })
}
