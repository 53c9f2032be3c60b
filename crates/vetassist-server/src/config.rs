use anyhow::{Context, Result};
use std::time::Duration;
use crate::sessions::DEFAULT_SESSION_TTL;
use triage::TriageConfig;

/// Public Retell API host
pub const DEFAULT_RETELL_BASE_URL: &str = "https://api.retellai.com";

/// Retell voice API credentials and endpoint.
#[derive(Debug, Clone)]
pub struct RetellConfig {
    /// Server-side secret; `None` means web calls cannot be created.
    pub api_key: Option<String>,
    /// Agent used when a request does not name one
    pub default_agent_id: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for RetellConfig {
    fn default() -> Self {
        Self {
            api_key: non_empty_env("RETELL_API_KEY"),
            default_agent_id: non_empty_env("RETELL_AGENT_ID"),
            base_url: std::env::var("RETELL_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_RETELL_BASE_URL.into()),
            timeout: Duration::from_secs(
                std::env::var("RETELL_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

impl RetellConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address, e.g. `0.0.0.0:3000`
    pub bind: String,
    pub retell: RetellConfig,
    pub triage: TriageConfig,
    /// Idle time before a live triage session is discarded
    pub session_ttl: Duration,
}

impl ServerConfig {
    /// Build from environment variables (`VETASSIST_BIND`, `PORT`,
    /// `VETASSIST_SESSION_TTL_SECS`, `RETELL_*`, `TRIAGE_*`).
    pub fn from_env() -> Result<Self> {
        let bind = non_empty_env("VETASSIST_BIND").unwrap_or_else(|| {
            let port = non_empty_env("PORT").unwrap_or_else(|| "3000".into());
            format!("0.0.0.0:{port}")
        });
        let triage = TriageConfig::from_env().context("Invalid triage configuration")?;
        let session_ttl = match non_empty_env("VETASSIST_SESSION_TTL_SECS") {
            Some(v) => Duration::from_secs(
                v.parse()
                    .with_context(|| format!("Invalid VETASSIST_SESSION_TTL_SECS: {v}"))?,
            ),
            None => DEFAULT_SESSION_TTL,
        };
        Ok(Self {
            bind,
            retell: RetellConfig::default(),
            triage,
            session_ttl,
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
