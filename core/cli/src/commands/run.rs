use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use leafscan_api::{router, AppContext, HttpServer};
use leafscan_classifier::{init_runtime, Classifier};
use leafscan_metadata::MetadataService;
use leafscan_utils::config::TomlConfigProvider;
use tracing::{info, warn};

use crate::utils::load_config;

pub async fn exec(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;

    // Nothing is served unless the model and every document loaded.
    let context = tokio::task::block_in_place(|| load_context(&config))?;

    let http = config.get::<HttpServer>()?;
    let server = HttpServer::bind(http.address).await?;
    info!("listening on {}", server.local_addr()?);

    server.serve(router(Arc::new(context)), shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}

fn load_context(config: &TomlConfigProvider) -> Result<AppContext> {
    let classifier_config = config.get::<Classifier>()?;
    init_runtime()?;
    let classifier =
        Classifier::load(&classifier_config).context("failed to load the classifier")?;

    let metadata_config = config.get::<MetadataService>()?;
    let metadata = MetadataService::load(&metadata_config, &classifier_config.image_info)
        .context("failed to load the training reports")?;
    info!("loaded the training reports");

    AppContext::new(classifier, &metadata).context("failed to prepare the stats response")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for the shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
