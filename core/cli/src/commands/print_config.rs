use std::path::Path;

use anyhow::Result;
use leafscan_utils::config::TomlConfigProvider;

use crate::utils::{capture_configs, load_config};

pub fn exec(config_path: &Path, default: bool) -> Result<()> {
    let config = if default {
        let config = TomlConfigProvider::new();
        capture_configs(&config)?;
        config
    } else {
        load_config(config_path)?
    };

    println!("{}", config.serialize_config()?);
    Ok(())
}
