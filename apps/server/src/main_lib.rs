use std::sync::Arc;

use crate::config::Config;
use dalal_core::{
    auth::AuthorizationExchanger,
    credentials::{CredentialResolver, CredentialStoreTrait, InMemoryCredentialStore},
    gateway::ProxyGateway,
    upstox::{ProviderConfig, ProviderTransport, UpstoxClient},
};
use dalal_storage_sqlite::{
    credentials::SqliteCredentialStore,
    db::{self, spawn_writer},
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub provider: Arc<ProviderConfig>,
    pub gateway: ProxyGateway,
    pub exchanger: AuthorizationExchanger,
}

pub fn init_tracing() {
    let log_format = std::env::var("DALAL_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn CredentialStoreTrait>> {
    if config.uses_in_memory_store() {
        tracing::warn!("Using in-memory credential store; tokens are lost on restart");
        return Ok(Arc::new(InMemoryCredentialStore::new()));
    }

    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);
    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = spawn_writer(&pool)?;
    Ok(Arc::new(SqliteCredentialStore::new(pool, writer)))
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let store = build_store(config).await?;

    let provider = Arc::new(ProviderConfig::from_settings(config.provider.clone())?);
    tracing::info!(
        "Upstox auth mode: {} (base URL {})",
        provider.auth_mode.as_str(),
        provider.base_url
    );
    if provider.oauth_client().is_err() && provider.api_key.is_none() {
        tracing::warn!("Neither Upstox OAuth settings nor UPSTOX_API_KEY are configured");
    }

    let transport: Arc<dyn ProviderTransport> = Arc::new(UpstoxClient::new(&provider)?);
    let resolver = CredentialResolver::new(store.clone());

    Ok(Arc::new(AppState {
        gateway: ProxyGateway::new(resolver, provider.clone(), transport.clone()),
        exchanger: AuthorizationExchanger::new(provider.clone(), transport, store),
        provider,
    }))
}
