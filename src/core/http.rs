//! HTTP webhook server using Axum

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::config::RelayConfig;
use crate::error::ConfigError;
use crate::models::{PaymentNotice, TradeSignal};
use crate::services::advisory::{analyze_signal, GeminiClient, TextModel};
use crate::services::directory::{AccessGrantor, DirectoryClient};
use crate::services::push::{FcmClient, Notifier, PushMessage};

pub const SERVICE_NAME: &str = "signal-relay";

/// Clients and settings shared by every handler. Built once at startup, never mutated.
#[derive(Clone)]
pub struct AppState {
    pub start_time: Arc<Instant>,
    pub advisor: Arc<dyn TextModel>,
    pub grantor: Arc<dyn AccessGrantor>,
    /// `None` when push delivery is not configured.
    pub notifier: Option<Arc<dyn Notifier>>,
    pub push_topic: String,
}

impl AppState {
    pub fn from_config(config: &RelayConfig) -> Result<Self, ConfigError> {
        if config.gemini.api_key.is_none() {
            warn!("GEMINI_API_KEY not set - every analysis will report failure");
        }
        if config.directory.api_key.is_none() || config.directory.base_url.is_none() {
            warn!("Directory service not configured - payment webhooks will fail");
        }

        let notifier: Option<Arc<dyn Notifier>> = match FcmClient::from_config(&config.push)? {
            Some(client) => Some(Arc::new(client)),
            None => {
                warn!("No push credentials configured - notifications disabled");
                None
            }
        };

        Ok(Self {
            start_time: Arc::new(Instant::now()),
            advisor: Arc::new(GeminiClient::new(&config.gemini)),
            grantor: Arc::new(DirectoryClient::new(&config.directory)),
            notifier,
            push_topic: config.push.topic.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvelopeStatus {
    #[serde(rename = "sucesso")]
    Success,
    #[serde(rename = "erro")]
    Error,
}

/// Response body of both webhooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: EnvelopeStatus,
    pub mensagem: String,
}

impl Envelope {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            mensagem: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            mensagem: message.into(),
        }
    }
}

type WebhookResponse = (StatusCode, Json<Envelope>);

fn reply(status: StatusCode, envelope: Envelope) -> WebhookResponse {
    (status, Json(envelope))
}

fn parse_json(body: &Bytes) -> Result<Value, String> {
    serde_json::from_slice(body).map_err(|e| format!("invalid JSON payload: {}", e))
}

fn parse_object(body: &Bytes) -> Result<Map<String, Value>, String> {
    match parse_json(body)? {
        Value::Object(map) => Ok(map),
        _ => Err("payload must be a JSON object".to_string()),
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "service": SERVICE_NAME
    }))
}

/// Charting-platform alert: analyze, then notify subscribers.
///
/// The body is parsed by hand instead of through `Json<T>` so alerts sent as `text/plain`
/// are accepted and parse failures still get an envelope.
async fn trade_webhook(State(state): State<AppState>, body: Bytes) -> WebhookResponse {
    info!(received_at = %Utc::now().to_rfc3339(), "Trade alert received");
    info!(payload = %String::from_utf8_lossy(&body), "Raw alert payload");

    let payload = match parse_object(&body) {
        Ok(payload) => payload,
        Err(message) => {
            error!(error = %message, "Rejecting trade alert");
            return reply(StatusCode::BAD_REQUEST, Envelope::error(message));
        }
    };

    let signal = TradeSignal::from_payload(&payload);
    info!(
        strategy = %signal.strategy,
        ticker = %signal.ticker,
        price = %signal.price,
        timeframe = %signal.timeframe,
        "Signal received"
    );

    let advisory = analyze_signal(state.advisor.as_ref(), &signal).await;
    info!(advisory = %advisory, "AI advisory");

    dispatch_notification(&state, &signal, &advisory).await;

    reply(
        StatusCode::OK,
        Envelope::success("alert received and analyzed by the AI"),
    )
}

pub fn notification_for(signal: &TradeSignal, advisory: &str, topic: &str) -> PushMessage {
    PushMessage::new(
        format!("{} signal on {}", signal.strategy, signal.ticker),
        advisory,
    )
    .with_topic(topic)
    .with_data("strategy", signal.strategy.as_str())
    .with_data("ticker", signal.ticker.as_str())
    .with_data("price", signal.price.as_str())
    .with_data("timeframe", signal.timeframe.as_str())
}

async fn dispatch_notification(state: &AppState, signal: &TradeSignal, advisory: &str) {
    let Some(notifier) = state.notifier.as_ref() else {
        info!("Push delivery disabled, skipping notification");
        return;
    };

    let message = notification_for(signal, advisory, &state.push_topic);
    if !notifier.notify(&message).await {
        warn!(ticker = %signal.ticker, "Notification not delivered");
    }
}

/// Payment confirmation: grant the paid plan to the paying customer.
async fn payment_webhook(State(state): State<AppState>, body: Bytes) -> WebhookResponse {
    info!(received_at = %Utc::now().to_rfc3339(), "Payment webhook received");
    info!(payload = %String::from_utf8_lossy(&body), "Raw payment payload");

    let payload = match parse_json(&body) {
        Ok(payload) => payload,
        Err(message) => {
            error!(error = %message, "Rejecting payment webhook");
            return reply(StatusCode::BAD_REQUEST, Envelope::error(message));
        }
    };

    let Some(notice) = PaymentNotice::from_payload(&payload) else {
        warn!("Payment webhook without customer_email");
        return reply(
            StatusCode::BAD_REQUEST,
            Envelope::error("customer_email missing from payload"),
        );
    };

    match state.grantor.grant_access(&notice.customer_email).await {
        Ok(message) => {
            info!(email = %notice.customer_email, "Access granted");
            reply(StatusCode::OK, Envelope::success(message))
        }
        Err(e) => {
            error!(email = %notice.customer_email, error = %e, "Access grant failed");
            reply(StatusCode::INTERNAL_SERVER_ERROR, Envelope::error(e.to_string()))
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/webhook", post(trade_webhook))
        .route("/webhook-xgrow", post(payment_webhook))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(config: RelayConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let state = AppState::from_config(&config)?;
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    info!(port = config.port, "Webhook server listening on port {}", config.port);
    axum::serve(listener, app).await?;

    Ok(())
}
