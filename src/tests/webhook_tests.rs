//! tests/webhook_tests.rs
//! Webhooks de Twilio: estado, teclas, opt-out y entrada de voz.

use crate::models::call_model::CallStatus;
use crate::models::webhook_model::{DigitsInput, StatusCallback, VoiceQuery};
use crate::tests::support::{
    campaign_request, forward_action, info_action, seed_initiated_call, test_context,
    StubTelephony, TestContext,
};

fn status(call_sid: &str, call_status: &str, duration: Option<&str>) -> StatusCallback {
    StatusCallback {
        call_sid: call_sid.to_string(),
        call_status: call_status.to_string(),
        call_duration: duration.map(str::to_string),
    }
}

fn digits(call_sid: &str, pressed: &str) -> DigitsInput {
    DigitsInput {
        call_sid: call_sid.to_string(),
        digits: pressed.to_string(),
    }
}

async fn current_status(ctx: &TestContext, call_id: &str) -> (CallStatus, i64) {
    let call = ctx
        .call_service
        .get_call(call_id)
        .await
        .unwrap()
        .expect("call must exist");
    (call.status, call.duration)
}

async fn events(ctx: &TestContext, call_id: &str) -> Vec<String> {
    ctx.call_service
        .list_logs(call_id)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.event)
        .collect()
}

#[actix_rt::test]
async fn test_no_answer_marks_call_failed() {
    let ctx = test_context(StubTelephony::accepting()).await;
    let (_, call) = seed_initiated_call(
        &ctx,
        campaign_request("Promo", true, vec![]),
        "Ann",
        "en",
        "CA100",
    )
    .await;

    ctx.webhook_service
        .on_status(status("CA100", "no-answer", None))
        .await;

    assert_eq!(current_status(&ctx, &call.id).await, (CallStatus::Failed, 0));
    let logs = ctx.call_service.list_logs(&call.id).await.unwrap();
    assert_eq!(logs[0].event, "no-answer");
    assert_eq!(logs[0].details, "Call status: no-answer");
}

#[actix_rt::test]
async fn test_status_progression_and_duration() {
    let ctx = test_context(StubTelephony::accepting()).await;
    let (_, call) = seed_initiated_call(
        &ctx,
        campaign_request("Promo", true, vec![]),
        "Ann",
        "en",
        "CA101",
    )
    .await;

    ctx.webhook_service
        .on_status(status("CA101", "in-progress", None))
        .await;
    assert_eq!(current_status(&ctx, &call.id).await, (CallStatus::InProgress, 0));

    // Un "ringing" tardío no hace retroceder el estado
    ctx.webhook_service
        .on_status(status("CA101", "ringing", None))
        .await;
    assert_eq!(current_status(&ctx, &call.id).await, (CallStatus::InProgress, 0));

    ctx.webhook_service
        .on_status(status("CA101", "completed", Some("42")))
        .await;
    assert_eq!(current_status(&ctx, &call.id).await, (CallStatus::Completed, 42));
}

#[actix_rt::test]
async fn test_completed_is_idempotent_and_terminal() {
    let ctx = test_context(StubTelephony::accepting()).await;
    let (_, call) = seed_initiated_call(
        &ctx,
        campaign_request("Promo", true, vec![]),
        "Ann",
        "en",
        "CA102",
    )
    .await;

    ctx.webhook_service
        .on_status(status("CA102", "completed", Some("30")))
        .await;
    ctx.webhook_service
        .on_status(status("CA102", "completed", Some("30")))
        .await;
    assert_eq!(current_status(&ctx, &call.id).await, (CallStatus::Completed, 30));

    ctx.webhook_service
        .on_status(status("CA102", "failed", None))
        .await;
    assert_eq!(current_status(&ctx, &call.id).await, (CallStatus::Completed, 30));
}

#[actix_rt::test]
async fn test_invalid_duration_is_ignored() {
    let ctx = test_context(StubTelephony::accepting()).await;
    let (_, call) = seed_initiated_call(
        &ctx,
        campaign_request("Promo", true, vec![]),
        "Ann",
        "en",
        "CA103",
    )
    .await;

    ctx.webhook_service
        .on_status(status("CA103", "completed", Some("abc")))
        .await;
    assert_eq!(current_status(&ctx, &call.id).await, (CallStatus::Completed, 0));

    ctx.webhook_service
        .on_status(status("CA103", "completed", Some("-5")))
        .await;
    assert_eq!(current_status(&ctx, &call.id).await, (CallStatus::Completed, 0));
}

#[actix_rt::test]
async fn test_unmapped_status_is_only_logged() {
    let ctx = test_context(StubTelephony::accepting()).await;
    let (_, call) = seed_initiated_call(
        &ctx,
        campaign_request("Promo", true, vec![]),
        "Ann",
        "en",
        "CA104",
    )
    .await;

    ctx.webhook_service
        .on_status(status("CA104", "canceled", None))
        .await;
    assert_eq!(current_status(&ctx, &call.id).await.0, CallStatus::Initiated);
    assert_eq!(events(&ctx, &call.id).await, vec!["canceled"]);
}

#[actix_rt::test]
async fn test_status_for_unknown_call_changes_nothing() {
    let ctx = test_context(StubTelephony::accepting()).await;
    let (_, call) = seed_initiated_call(
        &ctx,
        campaign_request("Promo", true, vec![]),
        "Ann",
        "en",
        "CA105",
    )
    .await;

    ctx.webhook_service
        .on_status(status("CA_UNKNOWN", "completed", Some("10")))
        .await;
    ctx.webhook_service.on_status(status("", "completed", None)).await;

    assert_eq!(current_status(&ctx, &call.id).await, (CallStatus::Initiated, 0));
    assert!(events(&ctx, &call.id).await.is_empty());
}

#[actix_rt::test]
async fn test_dynamic_forward_on_digit() {
    let ctx = test_context(StubTelephony::accepting()).await;
    let (_, call) = seed_initiated_call(
        &ctx,
        campaign_request("Promo", true, vec![forward_action("1", "+15551234567", "")]),
        "Ann",
        "en",
        "CA123",
    )
    .await;

    let twiml = ctx.webhook_service.on_digits(digits("CA123", "1")).await;

    assert!(twiml.contains("<Dial>+15551234567</Dial>"));
    assert!(!twiml.contains("<Gather"));

    let logs = ctx.call_service.list_logs(&call.id).await.unwrap();
    let recorded: Vec<&str> = logs.iter().map(|l| l.event.as_str()).collect();
    assert_eq!(recorded, vec!["action_forward_executed", "input_received"]);
    assert!(logs.iter().all(|l| l.user_input.as_deref() == Some("1")));
}

#[actix_rt::test]
async fn test_dynamic_repeat_and_unknown_digits() {
    let ctx = test_context(StubTelephony::accepting()).await;
    let mut req = campaign_request("Promo", true, vec![info_action("1", "We ship worldwide")]);
    req.intro_text = "Big summer sale".to_string();
    let (_, call) = seed_initiated_call(&ctx, req, "Ann", "en", "CA124").await;

    for pressed in ["0", "7"] {
        let twiml = ctx.webhook_service.on_digits(digits("CA124", pressed)).await;
        assert!(twiml.contains("Big summer sale"));
        assert!(twiml.contains("Press 1 for We ship worldwide. Press 0 to repeat this menu"));
        // El menú repetido no vuelve a saludar por nombre
        assert!(!twiml.contains("Ann"));
    }

    assert_eq!(
        events(&ctx, &call.id).await,
        vec!["input_received", "input_received"]
    );
}

#[actix_rt::test]
async fn test_dynamic_information_digit() {
    let ctx = test_context(StubTelephony::accepting()).await;
    let (_, call) = seed_initiated_call(
        &ctx,
        campaign_request("Promo", true, vec![info_action("2", "We ship worldwide")]),
        "Ann",
        "es",
        "CA125",
    )
    .await;

    let twiml = ctx.webhook_service.on_digits(digits("CA125", "2")).await;
    assert!(twiml.contains(r#"language="es-ES">We ship worldwide</Say>"#));
    assert!(twiml.contains("<Gather"));
    assert_eq!(events(&ctx, &call.id).await[0], "action_information_executed");
}

#[actix_rt::test]
async fn test_static_menu_for_campaign_without_content() {
    let ctx = test_context(StubTelephony::accepting()).await;
    let (_, call) = seed_initiated_call(
        &ctx,
        campaign_request("Plain", true, vec![]),
        "Ann",
        "en",
        "CA126",
    )
    .await;

    let twiml = ctx.webhook_service.on_digits(digits("CA126", "1")).await;
    assert!(twiml.contains("Our new product offers cutting-edge features"));
    assert_eq!(
        events(&ctx, &call.id).await,
        vec!["product_info_requested", "input_received"]
    );

    let twiml = ctx.webhook_service.on_digits(digits("CA126", "3")).await;
    assert!(twiml.contains(r#"<Gather action="/api/webhook/optout""#));

    let twiml = ctx.webhook_service.on_digits(digits("CA126", "5")).await;
    assert!(twiml.contains("Sorry, that was not a valid option."));
}

#[actix_rt::test]
async fn test_unknown_call_sid_gets_static_english_menu() {
    let ctx = test_context(StubTelephony::accepting()).await;

    let twiml = ctx.webhook_service.on_digits(digits("CA_UNKNOWN", "2")).await;
    assert!(twiml.contains(r#"language="en-US""#));
    assert!(twiml.contains("WELCOME20"));
}

#[actix_rt::test]
async fn test_opt_out_confirmation() {
    let ctx = test_context(StubTelephony::accepting()).await;
    let (_, call) = seed_initiated_call(
        &ctx,
        campaign_request("Plain", true, vec![]),
        "Ann",
        "fr",
        "CA127",
    )
    .await;

    let twiml = ctx.webhook_service.on_opt_out(digits("CA127", "1")).await;
    assert!(twiml.contains(r#"language="fr-FR""#));
    assert!(twiml.contains("<Hangup/>"));

    let logs = ctx.call_service.list_logs(&call.id).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].event, "opted_out");
    assert_eq!(logs[0].user_input.as_deref(), Some("1"));

    let twiml = ctx.webhook_service.on_opt_out(digits("CA127", "0")).await;
    assert!(twiml.contains("<Gather"));
    assert!(!twiml.contains("<Hangup/>"));
    assert_eq!(events(&ctx, &call.id).await.len(), 1);
}

#[actix_rt::test]
async fn test_voice_entry_uses_campaign_content() {
    let ctx = test_context(StubTelephony::accepting()).await;
    let mut req = campaign_request("Promo", true, vec![forward_action("1", "+15551234567", "")]);
    req.intro_text = "Big summer sale".to_string();
    let (_, call) = seed_initiated_call(&ctx, req, "Ann", "en", "CA128").await;

    let twiml = ctx
        .webhook_service
        .on_voice(VoiceQuery {
            call_id: Some(call.id.clone()),
            language: None,
        })
        .await;

    assert!(twiml.contains("Hello Ann, welcome to our marketing campaign."));
    assert!(twiml.contains("Big summer sale"));
    assert!(twiml.contains("Press 1 to speak with an agent"));
}

#[actix_rt::test]
async fn test_voice_entry_language_and_static_fallback() {
    let ctx = test_context(StubTelephony::accepting()).await;
    let (_, call) = seed_initiated_call(
        &ctx,
        campaign_request("Plain", true, vec![]),
        "Ana",
        "en",
        "CA129",
    )
    .await;

    let twiml = ctx
        .webhook_service
        .on_voice(VoiceQuery {
            call_id: Some(call.id.clone()),
            language: Some("es".to_string()),
        })
        .await;
    assert!(twiml.contains("Hola Ana, bienvenido"));
    assert!(twiml.contains("Presione 9 para repetir el menú."));

    let twiml = ctx.webhook_service.on_voice(VoiceQuery::default()).await;
    assert!(twiml.contains("Hello welcome to our marketing campaign."));
    assert!(twiml.contains(r#"language="en-US""#));
}

#[actix_rt::test]
async fn test_overlapping_status_callbacks_keep_terminal_state() {
    let ctx = test_context(StubTelephony::accepting()).await;
    let (_, call) = seed_initiated_call(
        &ctx,
        campaign_request("Promo", true, vec![]),
        "Ann",
        "en",
        "CA900",
    )
    .await;

    tokio::join!(
        ctx.webhook_service
            .on_status(status("CA900", "completed", Some("30"))),
        ctx.webhook_service
            .on_status(status("CA900", "in-progress", None)),
    );
    assert_eq!(current_status(&ctx, &call.id).await, (CallStatus::Completed, 30));

    let (_, call) = seed_initiated_call(
        &ctx,
        campaign_request("Promo", true, vec![]),
        "Bob",
        "en",
        "CA901",
    )
    .await;

    tokio::join!(
        ctx.webhook_service
            .on_status(status("CA901", "in-progress", None)),
        ctx.webhook_service.on_status(status("CA901", "no-answer", None)),
        ctx.webhook_service.on_status(status("CA901", "ringing", None)),
    );
    assert_eq!(current_status(&ctx, &call.id).await.0, CallStatus::Failed);
    assert_eq!(events(&ctx, &call.id).await.len(), 3);
}

#[actix_rt::test]
async fn test_status_write_only_applies_over_expected_state() {
    let ctx = test_context(StubTelephony::accepting()).await;
    let (_, call) = seed_initiated_call(
        &ctx,
        campaign_request("Promo", true, vec![]),
        "Ann",
        "en",
        "CA902",
    )
    .await;

    let written = ctx
        .call_service
        .update_status(&call.id, CallStatus::Initiated, CallStatus::Completed, Some(9))
        .await
        .unwrap();
    assert!(written);

    // Lectura vieja: el estado guardado ya no es "initiated"
    let written = ctx
        .call_service
        .update_status(&call.id, CallStatus::Initiated, CallStatus::InProgress, None)
        .await
        .unwrap();
    assert!(!written);
    assert_eq!(current_status(&ctx, &call.id).await, (CallStatus::Completed, 9));
}

#[actix_rt::test]
async fn test_webhooks_survive_call_log_write_failures() {
    let ctx = test_context(StubTelephony::accepting()).await;
    let (_, call) = seed_initiated_call(
        &ctx,
        campaign_request("Promo", true, vec![forward_action("1", "+15551234567", "")]),
        "Ann",
        "en",
        "CA903",
    )
    .await;

    sqlx::query("DROP TABLE call_logs")
        .execute(&ctx.pool)
        .await
        .unwrap();

    let twiml = ctx.webhook_service.on_digits(digits("CA903", "1")).await;
    assert!(twiml.contains("<Dial>+15551234567</Dial>"));

    let twiml = ctx.webhook_service.on_opt_out(digits("CA903", "1")).await;
    assert!(twiml.contains("<Hangup/>"));

    ctx.webhook_service
        .on_status(status("CA903", "in-progress", None))
        .await;
    assert_eq!(current_status(&ctx, &call.id).await.0, CallStatus::InProgress);

    ctx.webhook_service
        .on_status(status("CA903", "completed", Some("15")))
        .await;
    assert_eq!(current_status(&ctx, &call.id).await, (CallStatus::Completed, 15));

    assert!(ctx.call_service.list_logs(&call.id).await.is_err());
}
