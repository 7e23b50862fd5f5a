//! Webhook HTTP server: receives provider POSTs, dispatches, answers TwiML.

use crate::channels::{InboundMessage, TwilioChannel};
use crate::config::{self, Config};
use crate::dispatch::Dispatcher;
use crate::gateway::twiml;
use crate::knowledge;
use crate::llm::GeminiClient;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared state for the gateway (config + dispatcher).
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub dispatcher: Arc<Dispatcher>,
}

/// Form fields the provider POSTs to the webhook. Extra fields are ignored;
/// missing ones default to empty so the handler never rejects a request.
#[derive(Debug, Deserialize)]
pub struct WebhookForm {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}

/// Run the gateway server; binds to config.gateway.bind:config.gateway.port.
/// Blocks until shutdown (e.g. Ctrl+C).
/// `config_path` is the path to the config file (used to resolve the knowledge base location).
pub async fn run_gateway(config: Config, config_path: PathBuf) -> Result<()> {
    let knowledge_path = config::resolve_knowledge_path(&config, &config_path);
    let knowledge = knowledge::load_knowledge(&knowledge_path);

    let llm = Arc::new(GeminiClient::new(
        config::resolve_gemini_api_key(&config),
        config.llm.model.clone(),
        config.llm.base_url.clone(),
    ));
    let transport = Arc::new(TwilioChannel::new(
        config::resolve_account_sid(&config),
        config::resolve_auth_token(&config),
        config::resolve_sender_address(&config),
    ));
    let practitioner = config::resolve_practitioner_address(&config).unwrap_or_default();
    if practitioner.is_empty() {
        log::warn!("practitioner address not configured; escalations cannot be delivered");
    }
    let dispatcher = Arc::new(Dispatcher::new(practitioner, knowledge, llm, transport));

    let state = GatewayState {
        config: Arc::new(config.clone()),
        dispatcher,
    };

    let app = Router::new()
        .route("/", get(health_http))
        .route("/webhook", post(webhook))
        .with_state(state);

    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// POST /webhook — always 200 with a TwiML document; internal failures are
/// absorbed so the provider never sees an error and never retry-storms.
async fn webhook(State(state): State<GatewayState>, Form(form): Form<WebhookForm>) -> impl IntoResponse {
    let inbound = InboundMessage {
        from: form.from,
        body: form.body.trim().to_string(),
    };
    log::info!("inbound message from {}", inbound.from);
    let reply = state
        .dispatcher
        .handle_inbound(&inbound.from, &inbound.body)
        .await;
    let doc = twiml::messaging_response(reply.as_deref());
    ([(header::CONTENT_TYPE, "application/xml")], doc)
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
    }))
}
