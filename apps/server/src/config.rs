use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use dalal_core::upstox::ProviderSettings;

/// Database path that selects the process-local credential store.
pub const IN_MEMORY_DB: &str = ":memory:";

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub provider: ProviderSettings,
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = env_opt("DALAL_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid DALAL_LISTEN_ADDR")?;
        let db_path = env_opt("DALAL_DB_PATH").unwrap_or_else(|| "./db/app.db".into());
        let cors_allow = env_opt("DALAL_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = env_opt("DALAL_REQUEST_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(30000);
        let upstox_timeout_secs = match env_opt("UPSTOX_TIMEOUT_SECS") {
            Some(v) => Some(v.parse::<u64>().context("Invalid UPSTOX_TIMEOUT_SECS")?),
            None => None,
        };

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            provider: ProviderSettings {
                base_url: env_opt("UPSTOX_API_BASE_URL"),
                client_id: env_opt("UPSTOX_CLIENT_ID"),
                client_secret: env_opt("UPSTOX_CLIENT_SECRET"),
                redirect_uri: env_opt("UPSTOX_REDIRECT_URI"),
                api_key: env_opt("UPSTOX_API_KEY"),
                auth_mode: env_opt("UPSTOX_AUTH_MODE"),
                timeout_secs: upstox_timeout_secs,
            },
        })
    }

    pub fn uses_in_memory_store(&self) -> bool {
        self.db_path == IN_MEMORY_DB
    }
}
