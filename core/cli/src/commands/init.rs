use std::net::SocketAddr;
use std::path::Path;

use anyhow::{anyhow, Result};
use leafscan_api::{HttpConfig, HttpServer};
use leafscan_utils::config::TomlConfigProvider;
use tracing::info;

use crate::utils::{capture_configs, ensure_parent_exist};

pub fn exec(config_path: &Path, force: bool, http_address: Option<SocketAddr>) -> Result<()> {
    if config_path.exists() && !force {
        return Err(anyhow!(
            "Configuration file already exists at {}",
            config_path.display()
        ));
    }

    let config = TomlConfigProvider::new();
    if let Some(address) = http_address {
        config.inject::<HttpServer>(HttpConfig { address })?;
    }
    capture_configs(&config)?;

    ensure_parent_exist(config_path)?;
    config.write(config_path)?;
    info!("Configuration file written to {}", config_path.display());

    Ok(())
}
