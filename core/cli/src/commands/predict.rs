use std::path::Path;

use anyhow::{Context, Result};
use leafscan_api::types::PredictResponse;
use leafscan_classifier::{init_runtime, Classifier};

use crate::utils::load_config;

pub async fn exec(config_path: &Path, image: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let classifier_config = config.get::<Classifier>()?;

    let classifier = tokio::task::block_in_place(|| {
        init_runtime()?;
        Classifier::load(&classifier_config)
    })
    .context("failed to load the classifier")?;

    let predictions = classifier.predict(image).await?;
    let response = PredictResponse::from(predictions);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
