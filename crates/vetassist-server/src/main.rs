use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use triage::MatchMode;
use vetassist_server::ServerConfig;

/// Command-line arguments. Flags override the matching environment variables.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Listen address (overrides VETASSIST_BIND / PORT)
    #[arg(long)]
    bind: Option<String>,

    /// Keyword matching: substring or word_boundary (overrides TRIAGE_MATCH_MODE)
    #[arg(long)]
    match_mode: Option<MatchMode>,

    /// TOML keyword dictionary (overrides TRIAGE_DICTIONARY_PATH)
    #[arg(long)]
    dictionary: Option<PathBuf>,

    /// Retell API base URL (overrides RETELL_BASE_URL)
    #[arg(long)]
    retell_base_url: Option<String>,

    /// Seconds a triage session may sit idle (overrides VETASSIST_SESSION_TTL_SECS)
    #[arg(long)]
    session_ttl_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = ServerConfig::from_env()?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(mode) = args.match_mode {
        config.triage.match_mode = mode;
    }
    if let Some(path) = args.dictionary {
        config.triage.dictionary_path = Some(path);
    }
    if let Some(url) = args.retell_base_url {
        config.retell.base_url = url;
    }
    if let Some(secs) = args.session_ttl_secs {
        config.session_ttl = Duration::from_secs(secs);
    }

    info!(
        bind = %config.bind,
        retell = %config.retell.base_url,
        match_mode = %config.triage.match_mode,
        session_ttl_secs = config.session_ttl.as_secs(),
        "VetAssist server starting"
    );

    vetassist_server::run(config).await
}
