//! BETSLIP — betting-slip cart engine
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires the sportsbook client and notification sink into a cart
//! session, and serves the cart API with graceful shutdown.

use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use betslip::api;
use betslip::config;
use betslip::engine::CartSession;
use betslip::notify::LogNotifier;
use betslip::platform::sportsbook::SportsbookClient;

const BANNER: &str = r#"
 ____  _____ _____ ____  _     ___ ____
| __ )| ____|_   _/ ___|| |   |_ _|  _ \
|  _ \|  _|   | | \___ \| |    | || |_) |
| |_) | |___  | |  ___) | |___ | ||  __/
|____/|_____| |_| |____/|_____|___|_|

  Betting-Slip Cart Engine
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = config::AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        sportsbook = %cfg.sportsbook.base_url,
        currency = %cfg.cart.currency,
        "BETSLIP starting up"
    );

    // -- Initialise components -------------------------------------------

    let api_key = cfg
        .sportsbook
        .api_key_env
        .as_deref()
        .and_then(|env| std::env::var(env).ok())
        .map(SecretString::new);
    if api_key.is_none() {
        warn!("No sportsbook API key configured, placement requests go unauthenticated");
    }

    let timeout = Duration::from_secs(cfg.sportsbook.request_timeout_secs);
    let platform = Arc::new(SportsbookClient::new(
        cfg.sportsbook.base_url.clone(),
        api_key,
        timeout,
    )?);
    let notifier = Arc::new(LogNotifier);

    // One cart session per process: the engine is session-scoped state
    // owned here and shared by reference with the API handlers.
    let session = Arc::new(CartSession::new(platform, notifier, timeout));

    // -- Serve -----------------------------------------------------------

    if !cfg.server.enabled {
        warn!("API server disabled in config, nothing to do");
        return Ok(());
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tokio::select! {
        result = api::serve(session.clone(), cfg.server.port) => {
            result?;
        }
        _ = &mut shutdown => {
            info!("Shutdown signal received.");
        }
    }

    info!(
        slips_pending = session.slips().await.len(),
        "BETSLIP shut down cleanly."
    );

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("betslip=info"));

    let json_logging = std::env::var("BETSLIP_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
