mod config;
mod errors;
mod llm_client;
mod pipeline;
mod rubric;
mod table;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::VllmClient;
use crate::pipeline::Labeler;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on bad values or a missing input file)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting labeler v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client and make sure the model is actually served
    let client = VllmClient::new(&config)?;
    client.verify_model(config.max_model_len).await?;
    info!(
        "LLM client initialized (model: {}, base URL: {})",
        config.model, config.llm_base_url
    );

    let labeler = Labeler::new(config, Arc::new(client));
    info!("Response contract: {}", labeler.contract());

    let summary = labeler.run().await?;
    info!(
        "Done: {} rows, {} labeled, {} parse failures, {} empty outputs",
        summary.rows, summary.labeled, summary.parse_failures, summary.empty_outputs
    );

    Ok(())
}
