//! Credit risk prediction service entrypoint: load config and model once, then serve.

use credit_risk_api::{
    config::ServiceConfig,
    logging::StructuredLogger,
    model::load_scorer,
    server::{run_server, AppState},
};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::var("RISK_API_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.json"));
    let config = ServiceConfig::load(&config_path);

    StructuredLogger::init(config.log.json, &config.log.level);

    info!(
        config = %config_path.display(),
        model_path = %config.model_path.display(),
        "credit risk API starting"
    );

    let scorer = load_scorer(&config.model_path)?;
    let state = AppState::new(scorer, config.report.clone());

    run_server(&config, state).await?;
    info!("credit risk API stopped");
    Ok(())
}
