//! Integration tests for the webhook server
//!
//! Gemini and the directory service are wiremock servers; push delivery goes to a
//! recording double.


use serde_json::{json, Value};
use signal_relay::core::http::{Envelope, EnvelopeStatus};
use signal_relay::models::NOT_AVAILABLE;
use signal_relay::services::advisory::ANALYSIS_FAILED;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use test_utils::{
    mock_directory_users, mock_gemini_failure, mock_gemini_text, TestApp, DIRECTORY_KEY,
    TARGET_PLAN,
};

#[tokio::test]
async fn health_endpoint_reports_healthy_status() {
    let app = TestApp::new().await;
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].as_u64().is_some());
    assert_eq!(body["service"], "signal-relay");
}

#[tokio::test]
async fn breakout_alert_is_analyzed_and_notified_once() {
    let app = TestApp::new().await;
    mock_gemini_text(&app.gemini, "Analysis: strong momentum. Confidence: 8").await;

    let response = app
        .server
        .post("/webhook")
        .json(&json!({
            "strategy": "breakout",
            "ticker": "BTCUSD",
            "price": 65000,
            "timeframe": "1h"
        }))
        .await;

    assert_eq!(response.status_code(), 200);
    let envelope: Envelope = response.json();
    assert_eq!(envelope.status, EnvelopeStatus::Success);
    assert!(!envelope.mensagem.is_empty());

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].title.contains("breakout"));
    assert!(sent[0].title.contains("BTCUSD"));
    assert_eq!(sent[0].body, "Analysis: strong momentum. Confidence: 8");
    assert_eq!(sent[0].topic, "trade_alerts");
    assert_eq!(sent[0].data["price"], "65000");
}

#[tokio::test]
async fn prompt_sent_to_gemini_carries_signal_fields() {
    let app = TestApp::new().await;
    mock_gemini_text(&app.gemini, "Analysis: fine. Confidence: 5").await;

    app.server
        .post("/webhook")
        .json(&json!({ "strategy": "pullback", "ticker": "ETHUSD", "price": "3100.5", "timeframe": "4h" }))
        .await;

    let requests = app.gemini.received_requests().await.expect("wiremock requests");
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].headers.get("x-goog-api-key").map(|v| v.to_str().unwrap()),
        Some("gemini-test-key")
    );
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("pullback"));
    assert!(prompt.contains("ETHUSD"));
    assert!(prompt.contains("3100.5"));
    assert!(prompt.contains("4h"));
}

#[tokio::test]
async fn missing_fields_are_replaced_with_sentinel() {
    let app = TestApp::new().await;
    mock_gemini_text(&app.gemini, "Analysis: unclear. Confidence: 2").await;

    let response = app
        .server
        .post("/webhook")
        .json(&json!({ "ticker": "SOLUSD" }))
        .await;
    assert_eq!(response.status_code(), 200);

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, format!("{} signal on SOLUSD", NOT_AVAILABLE));
    assert_eq!(sent[0].data["strategy"], NOT_AVAILABLE);
    assert_eq!(sent[0].data["price"], NOT_AVAILABLE);
    assert_eq!(sent[0].data["timeframe"], NOT_AVAILABLE);
}

#[tokio::test]
async fn empty_object_is_accepted() {
    let app = TestApp::new().await;
    mock_gemini_text(&app.gemini, "Analysis: none. Confidence: 0").await;

    let response = app.server.post("/webhook").json(&json!({})).await;
    assert_eq!(response.status_code(), 200);

    let requests = app.gemini.received_requests().await.expect("wiremock requests");
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("Asset: N/A"));
}

#[tokio::test]
async fn ai_failure_is_forwarded_as_advisory_text() {
    let app = TestApp::new().await;
    mock_gemini_failure(&app.gemini).await;

    let response = app
        .server
        .post("/webhook")
        .json(&json!({ "strategy": "breakout", "ticker": "BTCUSD", "price": 65000, "timeframe": "1h" }))
        .await;

    assert_eq!(response.status_code(), 200);
    let envelope: Envelope = response.json();
    assert_eq!(envelope.status, EnvelopeStatus::Success);

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].body, ANALYSIS_FAILED);
}

#[tokio::test]
async fn undelivered_notification_does_not_fail_the_alert() {
    let app = TestApp::with_failing_notifier().await;
    mock_gemini_text(&app.gemini, "Analysis: ok. Confidence: 7").await;

    let response = app
        .server
        .post("/webhook")
        .json(&json!({ "strategy": "breakout", "ticker": "BTCUSD" }))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(app.notifier.sent().len(), 1);
}

#[tokio::test]
async fn alert_succeeds_when_push_is_disabled() {
    let app = TestApp::without_push().await;
    mock_gemini_text(&app.gemini, "Analysis: ok. Confidence: 7").await;

    let response = app
        .server
        .post("/webhook")
        .json(&json!({ "strategy": "breakout", "ticker": "BTCUSD", "price": 65000, "timeframe": "1h" }))
        .await;

    assert_eq!(response.status_code(), 200);
    let envelope: Envelope = response.json();
    assert_eq!(envelope.status, EnvelopeStatus::Success);
    assert_eq!(app.gemini.received_requests().await.unwrap().len(), 1);
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn malformed_alert_returns_error_envelope() {
    let app = TestApp::new().await;

    let response = app.server.post("/webhook").text("{not json").await;
    assert_eq!(response.status_code(), 400);

    let envelope: Envelope = response.json();
    assert_eq!(envelope.status, EnvelopeStatus::Error);
    assert!(envelope.mensagem.contains("invalid JSON"));
    assert!(app.notifier.sent().is_empty());
    assert!(app.gemini.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn non_object_alert_is_rejected() {
    let app = TestApp::new().await;

    let response = app.server.post("/webhook").json(&json!(["breakout"])).await;
    assert_eq!(response.status_code(), 400);

    let body: Value = response.json();
    assert_eq!(body["status"], "erro");
}

#[tokio::test]
async fn plain_text_content_type_is_accepted() {
    let app = TestApp::new().await;
    mock_gemini_text(&app.gemini, "Analysis: ok. Confidence: 6").await;

    let response = app
        .server
        .post("/webhook")
        .text(r#"{"strategy":"breakout","ticker":"BTCUSD","price":"65000","timeframe":"1h"}"#)
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(app.notifier.sent().len(), 1);
}

#[tokio::test]
async fn payment_without_email_is_rejected_before_directory_call() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/webhook-xgrow")
        .json(&json!({ "product": "monthly" }))
        .await;

    assert_eq!(response.status_code(), 400);
    let envelope: Envelope = response.json();
    assert_eq!(envelope.status, EnvelopeStatus::Error);
    assert!(envelope.mensagem.contains("customer_email"));
    assert!(app.directory.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_payment_payload_returns_400() {
    let app = TestApp::new().await;

    let response = app.server.post("/webhook-xgrow").text("customer_email=foo").await;
    assert_eq!(response.status_code(), 400);
    assert!(app.directory.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn payment_grants_plan_to_case_insensitive_match() {
    let app = TestApp::new().await;
    mock_directory_users(
        &app.directory,
        json!([
            { "id": "u-1", "email": "someone@else.com", "plan": "free" },
            { "id": "u-2", "email": "Foo@Bar.com", "plan": "free" }
        ]),
    )
    .await;

    Mock::given(method("PUT"))
        .and(path("/users/u-2"))
        .and(header("authorization", format!("Bearer {}", DIRECTORY_KEY).as_str()))
        .and(body_json(json!({ "plan": TARGET_PLAN })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u-2", "plan": TARGET_PLAN })))
        .expect(1)
        .mount(&app.directory)
        .await;

    let response = app
        .server
        .post("/webhook-xgrow")
        .json(&json!({ "customer_email": "foo@bar.com" }))
        .await;

    assert_eq!(response.status_code(), 200);
    let envelope: Envelope = response.json();
    assert_eq!(envelope.status, EnvelopeStatus::Success);
    assert!(envelope.mensagem.contains(TARGET_PLAN));
}

#[tokio::test]
async fn payment_for_unknown_email_returns_500_without_update() {
    let app = TestApp::new().await;
    mock_directory_users(
        &app.directory,
        json!([{ "id": "u-1", "email": "someone@else.com", "plan": "free" }]),
    )
    .await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.directory)
        .await;

    let response = app
        .server
        .post("/webhook-xgrow")
        .json(&json!({ "customer_email": "foo@bar.com" }))
        .await;

    assert_eq!(response.status_code(), 500);
    let envelope: Envelope = response.json();
    assert_eq!(envelope.status, EnvelopeStatus::Error);
    assert_eq!(envelope.mensagem, "user not found for foo@bar.com");
}

#[tokio::test]
async fn directory_outage_returns_500() {
    let app = TestApp::new().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.directory)
        .await;

    let response = app
        .server
        .post("/webhook-xgrow")
        .json(&json!({ "customer_email": "foo@bar.com" }))
        .await;

    assert_eq!(response.status_code(), 500);
    let envelope: Envelope = response.json();
    assert!(envelope.mensagem.starts_with("failed to list directory users"));
}

#[tokio::test]
async fn unconfigured_directory_returns_500() {
    let app = TestApp::without_directory_credentials().await;

    let response = app
        .server
        .post("/webhook-xgrow")
        .json(&json!({ "customer_email": "foo@bar.com" }))
        .await;

    assert_eq!(response.status_code(), 500);
    let envelope: Envelope = response.json();
    assert!(envelope.mensagem.contains("not configured"));
    assert!(app.directory.received_requests().await.unwrap().is_empty());
}
