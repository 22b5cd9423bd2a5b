use std::fs::create_dir_all;
use std::path::Path;

use anyhow::{bail, Result};
use leafscan_api::HttpServer;
use leafscan_classifier::Classifier;
use leafscan_metadata::MetadataService;
use leafscan_utils::config::TomlConfigProvider;
use tracing::warn;

pub fn ensure_parent_exist(path: &Path) -> Result<()> {
    if let Some(parent_dir) = path.parent() {
        create_dir_all(parent_dir)?;
        Ok(())
    } else {
        bail!("Failed to get parent directory from given file: {:?}", path)
    }
}

/// Loads the configuration file, or the defaults when there is none yet.
pub fn load_config(path: &Path) -> Result<TomlConfigProvider> {
    let config = if path.exists() {
        TomlConfigProvider::load(path)?
    } else {
        warn!(
            "no configuration file at {}, using the defaults",
            path.display()
        );
        TomlConfigProvider::new()
    };
    capture_configs(&config)?;
    Ok(config)
}

/// Reads every section once so that defaults are recorded for missing ones.
pub fn capture_configs(config: &TomlConfigProvider) -> Result<()> {
    config.get::<HttpServer>()?;
    config.get::<Classifier>()?;
    config.get::<MetadataService>()?;
    Ok(())
}
