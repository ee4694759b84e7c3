//! tests/support.rs
//! Helpers compartidos por los tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

use crate::db;
use crate::logger;
use crate::models::call_model::Call;
use crate::models::campaign_model::{ActionType, Campaign, CreateCampaignRequest, IvrAction};
use crate::services::call_service::CallService;
use crate::services::campaign_service::CampaignService;
use crate::services::dialer_service::DialerService;
use crate::services::language_service::LanguageCatalog;
use crate::services::twilio_service::{OutboundCall, TelephonyClient};
use crate::services::webhook_service::WebhookService;

pub const WEBHOOK_BASE: &str = "https://ivr.example.test";

/// Proveedor simulado: acepta todo salvo los números en `fail_numbers`.
#[derive(Default)]
pub struct StubTelephony {
    fail_numbers: Vec<String>,
    delay: Option<Duration>,
    counter: AtomicUsize,
    placed: Mutex<Vec<OutboundCall>>,
}

impl StubTelephony {
    pub fn accepting() -> Self {
        Self::default()
    }

    pub fn rejecting(numbers: &[&str]) -> Self {
        Self {
            fail_numbers: numbers.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn placed(&self) -> Vec<OutboundCall> {
        self.placed.lock().unwrap().clone()
    }
}

#[async_trait]
impl TelephonyClient for StubTelephony {
    async fn place_call(&self, call: &OutboundCall) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.placed.lock().unwrap().push(call.clone());

        if self.fail_numbers.contains(&call.to) {
            return Err(anyhow!("Twilio API error (status 400): invalid 'To' number"));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("CA{:032}", n))
    }
}

pub struct TestContext {
    pub pool: Pool<Sqlite>,
    pub catalog: Arc<LanguageCatalog>,
    pub campaign_service: CampaignService,
    pub call_service: CallService,
    pub dialer_service: DialerService,
    pub webhook_service: WebhookService,
    pub telephony: Arc<StubTelephony>,
}

pub async fn test_context(stub: StubTelephony) -> TestContext {
    test_context_with_timeout(stub, Duration::from_secs(2)).await
}

pub async fn test_context_with_timeout(stub: StubTelephony, timeout: Duration) -> TestContext {
    logger::init_test_logger();

    let pool = db::connect_in_memory()
        .await
        .expect("Failed to open in-memory db");

    let catalog = Arc::new(LanguageCatalog::new());
    let campaign_service = CampaignService::new(pool.clone(), "en".to_string());
    let call_service = CallService::new(pool.clone());
    let telephony = Arc::new(stub);
    let client: Arc<dyn TelephonyClient> = telephony.clone();

    let dialer_service = DialerService::new(
        campaign_service.clone(),
        call_service.clone(),
        client,
        WEBHOOK_BASE.to_string(),
        "en".to_string(),
        timeout,
    );
    let webhook_service =
        WebhookService::new(call_service.clone(), campaign_service.clone(), catalog.clone());

    TestContext {
        pool,
        catalog,
        campaign_service,
        call_service,
        dialer_service,
        webhook_service,
        telephony,
    }
}

pub fn info_action(input: &str, message: &str) -> IvrAction {
    IvrAction {
        action_type: ActionType::Information,
        action_input: input.to_string(),
        message: message.to_string(),
        forward_phone: String::new(),
    }
}

pub fn forward_action(input: &str, phone: &str, message: &str) -> IvrAction {
    IvrAction {
        action_type: ActionType::Forward,
        action_input: input.to_string(),
        message: message.to_string(),
        forward_phone: phone.to_string(),
    }
}

pub fn campaign_request(name: &str, is_active: bool, actions: Vec<IvrAction>) -> CreateCampaignRequest {
    CreateCampaignRequest {
        name: name.to_string(),
        description: format!("{} description", name),
        language: Some("en".to_string()),
        intro_text: String::new(),
        actions,
        is_active,
    }
}

/// Campaña en memoria (sin DB) para los tests de TwiML puros.
pub fn campaign_fixture(intro_text: &str, actions: Vec<IvrAction>) -> Campaign {
    let ts = db::now();
    Campaign {
        id: "00000000-0000-0000-0000-000000000001".to_string(),
        name: "Promo".to_string(),
        description: "Promo description".to_string(),
        language: "en".to_string(),
        intro_text: intro_text.to_string(),
        actions,
        is_active: true,
        created_at: ts,
        updated_at: ts,
    }
}

/// Campaña guardada + llamada ya aceptada por el proveedor con `provider_ref`.
pub async fn seed_initiated_call(
    ctx: &TestContext,
    req: CreateCampaignRequest,
    customer_name: &str,
    language: &str,
    provider_ref: &str,
) -> (Campaign, Call) {
    let campaign = ctx
        .campaign_service
        .create_campaign(req)
        .await
        .expect("Failed to create campaign");
    let call = ctx
        .call_service
        .create_call(&campaign.id, "+15550001111", customer_name, language)
        .await
        .expect("Failed to create call");
    ctx.call_service
        .mark_initiated(&call.id, provider_ref)
        .await
        .expect("Failed to mark initiated");
    let call = ctx
        .call_service
        .get_call(&call.id)
        .await
        .unwrap()
        .expect("call must exist");
    (campaign, call)
}
