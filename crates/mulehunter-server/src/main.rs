//! MuleHunter — transaction risk scoring server.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mulehunter_core::MuleHunterConfig;
use mulehunter_runtime::RiskService;
use mulehunter_server::{build_router, AppState};

fn resolve_data_dir() -> PathBuf {
    std::env::var("MULEHUNTER_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let shared = dir.join("../shared-data");
                if shared.exists() {
                    return shared;
                }
            }
            PathBuf::from("shared-data")
        })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = MuleHunterConfig::from_env(&data_dir)?;
    let port = config.port;
    info!(
        "Verdict thresholds: critical>{:.2}, suspicious>={:.2}, flag>{:.2}",
        config.thresholds.critical, config.thresholds.suspicious, config.thresholds.flag
    );

    let service = RiskService::from_config(&config);
    let state = Arc::new(AppState::new(config, service));

    // Bootstrap before serving; a failure leaves the server up but unhealthy.
    let boot = state.clone();
    match tokio::task::spawn_blocking(move || boot.service.ensure_ready()).await? {
        Ok(()) => info!("Inference assets loaded"),
        Err(e) => warn!("Starting without a loaded model: {}", e),
    }

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("MuleHunter server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
