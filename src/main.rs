mod access;
mod config;
mod db;
mod error;
mod llm;
mod models;
mod rate_limit;
mod routes;
mod seed;
mod services;
mod state;
mod store;

use std::sync::Arc;

use crate::config::{AppConfig, StoreBackend};
use crate::llm::LlmChat;
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use crate::services::assistant::Assistant;
use crate::store::{FileStore, MemoryStore, PgStore, SharedStore};

async fn open_store(backend: &StoreBackend) -> SharedStore {
    match backend {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store — portal data is lost on restart");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::File(dir) => {
            let store = FileStore::open(dir).await.expect("store directory init failed");
            tracing::info!(dir = %store.root().display(), "using file store");
            Arc::new(store)
        }
        StoreBackend::Postgres { url, max_connections } => {
            let pool = db::connect_and_migrate(url, *max_connections)
                .await
                .expect("database init failed");
            tracing::info!(max_connections, "using postgres store");
            Arc::new(PgStore::new(pool))
        }
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().expect("invalid configuration");
    let store = open_store(&config.store).await;

    // Assistant features fall back to canned text when no provider is configured.
    let llm: Option<Arc<dyn LlmChat>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured — assistant will use fallbacks");
            None
        }
    };
    let limiter = RateLimiter::new(RateLimitConfig::from_env());
    let limits = limiter.config();
    let assistant = Assistant::new(llm, limiter);
    tracing::info!(
        configured = assistant.is_configured(),
        per_user = limits.per_user_limit,
        global = limits.global_limit,
        window_secs = limits.window.as_secs(),
        token_budget = limits.token_budget,
        "assistant ready"
    );

    let state = state::AppState::new(store, assistant, config.bus_capacity, config.toast_ttl)
        .with_secure_cookies(config.cookie_secure);
    tracing::info!(
        subscribers = state.bus.subscriber_count(),
        toast_ttl_secs = state.toasts.ttl().as_secs(),
        "notification bus ready"
    );

    let _simulator = config
        .simulator_interval
        .map(|interval| services::simulator::spawn_simulator(state.bus.clone(), interval));

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "nexlink portal listening");
    axum::serve(listener, app).await.expect("server failed");
}
