use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use adlens_server::{source::FileDatasetSource, state::AppState};

/// `adlens health`: liveness probe for Docker HEALTHCHECK.
///
/// Calls `GET http://localhost:$ADLENS_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("ADLENS_PORT").unwrap_or_else(|_| "3000".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }
    // Structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("adlens=info".parse()?),
        )
        .json()
        .init();

    let cfg = adlens_server::config::Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Missing dataset is not fatal: views answer 503 until the file appears.
    if !std::path::Path::new(&cfg.dataset_path).exists() {
        tracing::warn!(
            dataset_path = %cfg.dataset_path,
            "Dataset file not found. Views will report the dataset as unavailable \
             until ADLENS_DATASET_PATH points at a readable JSON file."
        );
    }

    info!(
        region_order = ?cfg.region_order,
        device_roas = ?cfg.device_roas,
        "Aggregation policies"
    );

    let source = FileDatasetSource::new(&cfg.dataset_path);
    let state = Arc::new(AppState::new(source, cfg.clone()));

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = adlens_server::app::build_app(Arc::clone(&state));

    info!(port = cfg.port, "adlens listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
