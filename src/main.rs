mod chart;
mod config;
mod errors;
mod market;
mod metrics;
mod pipeline;
mod pricing;
mod series;
mod server;
mod state;
mod strategies;

use crate::state::AppState;

#[tokio::main]
async fn main() {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("ada_perf starting");

    // Load config
    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    if cfg.alpaca.is_none() {
        tracing::warn!("ALPACA_KEY_ID / ALPACA_SECRET_KEY not set, /api/spy will fail until configured");
    }

    let app_state = AppState::new(cfg.clone());

    // ── Spawn tasks ──

    // 1. Benchmark refresher (sole writer of the shared benchmark, besides manual refreshes)
    let refresher_state = app_state.clone();
    tokio::spawn(async move {
        market::feed::run_benchmark_refresher(refresher_state).await;
    });

    // 2. Axum HTTP + WS server
    let app = server::build_router(app_state);

    let addr = format!("0.0.0.0:{}", cfg.server_port);
    tracing::info!("server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
    }
}
