// =============================================================================
// TickPulse — Main Entry Point
// =============================================================================
//
// Loads the runtime config, serves the API and refreshes every configured
// instrument on a fixed timer until Ctrl+C.  The config file is only written
// when it does not exist yet; env overrides never reach it.
// =============================================================================

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tickpulse::app_state::AppState;
use tickpulse::pipeline::Pipeline;
use tickpulse::quote_source::{QuoteSource, StaticQuoteSource};
use tickpulse::refresh::run_refresh_cycle;
use tickpulse::runtime_config::RuntimeConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("TickPulse starting up");

    let config_path =
        std::env::var("TICKPULSE_CONFIG").unwrap_or_else(|_| "tickpulse.json".into());

    let mut config = RuntimeConfig::load_or_create(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    // Override symbols from env if available.
    if let Ok(syms) = std::env::var("TICKPULSE_SYMBOLS") {
        config.symbols = syms
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if config.symbols.is_empty() {
        config.symbols = RuntimeConfig::default().symbols;
    }

    info!(symbols = ?config.symbols, "Configured instruments");

    // ── 2. Build pipeline, quote source and shared state ─────────────────
    let pipeline = Arc::new(Pipeline::from_config(&config)?);
    let source: Arc<dyn QuoteSource> = Arc::new(StaticQuoteSource::new(config.anchors.clone()));
    let refresh_every = tokio::time::Duration::from_secs(config.refresh_interval_secs);
    let state = Arc::new(AppState::new(config));

    // ── 3. Start the API server ──────────────────────────────────────────
    let api_state = state.clone();
    let bind_addr =
        std::env::var("TICKPULSE_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "API server listening");
    tokio::spawn(async move {
        let app = tickpulse::api::router(api_state);
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "API server failed");
        }
    });

    // ── 4. Refresh loop ──────────────────────────────────────────────────
    let loop_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(refresh_every);
        loop {
            interval.tick().await;
            let state = loop_state.clone();
            let pipeline = pipeline.clone();
            let source = source.clone();
            let date = chrono::Local::now().date_naive();
            let outcome = tokio::task::spawn_blocking(move || {
                run_refresh_cycle(&state, &pipeline, source.as_ref(), date)
            })
            .await;
            if let Err(e) = outcome {
                error!(error = %e, "Refresh cycle task panicked");
            }
        }
    });

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received, stopping gracefully");

    info!("TickPulse shut down complete.");
    Ok(())
}
