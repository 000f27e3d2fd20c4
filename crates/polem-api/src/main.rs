//! Polem API Server
//!
//! REST API server for named-entity lemmatization.

use polem_api::telemetry::init_tracing;
use polem_core::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration: optional TOML file, then environment overrides
    let config = match std::env::var("POLEM_CONFIG") {
        Ok(path) => AppConfig::from_file(path)?.with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };

    init_tracing(&config.logging);

    polem_api::serve(config).await
}
