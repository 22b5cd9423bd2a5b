use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::{env, fs, io};

use anyhow::{anyhow, Context, Result};
use lazy_static::lazy_static;
use resolve_path::PathResolveExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use toml::{Table, Value};

lazy_static! {
    pub static ref LEAFSCAN_HOME_DIR: PathBuf = env::var("LEAFSCAN_HOME")
        .unwrap_or("~/.leafscan".to_string())
        .into();
}

/// A component that reads its own section of the configuration file.
pub trait ConfigConsumer {
    /// The name of the toml table holding the section.
    const KEY: &'static str;

    type Config: Serialize + DeserializeOwned + Default;
}

/// The implementation of a configuration loader that uses the `toml` backend.
#[derive(Default, Debug)]
pub struct TomlConfigProvider {
    /// Every consumer owns one top-level key of this table. Sections that were
    /// requested but missing from the file are filled with their defaults, so
    /// the table always reflects the effective configuration.
    table: Mutex<Table>,
}

impl Clone for TomlConfigProvider {
    fn clone(&self) -> Self {
        Self {
            table: Mutex::new(self.lock().clone()),
        }
    }
}

impl TomlConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject<T: ConfigConsumer>(&self, config: T::Config) -> Result<()> {
        let value = Value::try_from(&config)
            .with_context(|| format!("Could not serialize the '{}' config.", T::KEY))?;
        self.lock().insert(T::KEY.to_owned(), value);
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow!(
                "The configuration file '{}' does not exist. Run the `init` command to create it.",
                path.to_string_lossy()
            ));
        }

        let content = fs::read_to_string(path).with_context(|| {
            format!(
                "IO: Could not load the configuration file '{}'.",
                path.to_string_lossy()
            )
        })?;

        Self::from_toml_str(&content).with_context(|| {
            format!(
                "Could not parse the configuration file '{}' as toml.",
                path.to_string_lossy()
            )
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table = toml::from_str::<Table>(content)?;
        Ok(Self {
            table: Mutex::new(table),
        })
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.serialize_config()?;
        fs::write(&path, content).with_context(|| {
            format!(
                "Could not write the configuration file: {}",
                path.as_ref().to_string_lossy()
            )
        })
    }

    /// Returns the section owned by `S`, falling back to its default when the
    /// key is absent.
    pub fn get<S: ConfigConsumer>(&self) -> Result<S::Config> {
        tracing::trace!("Getting the config for {}", std::any::type_name::<S>());

        let mut table = self.lock();

        let item: S::Config = match table.get(S::KEY) {
            Some(v) => v
                .clone()
                .try_into()
                .with_context(|| format!("Failed to deserialize '{}' config", S::KEY))?,
            None => S::Config::default(),
        };

        // Amend the internal table with the parsed or default item to be serialized later.
        table.insert(S::KEY.into(), Value::try_from(&item)?);

        Ok(item)
    }

    pub fn serialize_config(&self) -> Result<String> {
        toml::to_string(&*self.lock()).context("failed to serialize config")
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Expands a leading `~` and makes the path absolute.
pub fn resolve_path<P: AsRef<Path>>(path: P) -> io::Result<PathBuf> {
    Ok(path.as_ref().try_resolve()?.to_path_buf())
}
