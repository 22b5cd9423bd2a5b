use std::io;
use std::path::{Path, PathBuf};

use leafscan_utils::config::{resolve_path, ConfigConsumer};
use serde::Serialize;
use serde_json::value::RawValue;
use thiserror::Error;

use crate::config::MetadataConfig;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("failed to read the {name} document {}: {source}", path.display())]
    Io {
        name: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("the {name} document {} is not valid JSON: {source}", path.display())]
    Parse {
        name: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The training reports, kept as the exact JSON text found on disk.
#[derive(Serialize, Debug)]
pub struct MetadataBundle {
    pub training_stats: TrainingStats,
    pub image_stats: Box<RawValue>,
    pub test_results: Box<RawValue>,
}

#[derive(Serialize, Debug)]
pub struct TrainingStats {
    pub init: Box<RawValue>,
    pub tuning: Box<RawValue>,
}

/// Serves the static training and evaluation documents.
#[derive(Debug)]
pub struct MetadataService {
    bundle: MetadataBundle,
}

impl ConfigConsumer for MetadataService {
    const KEY: &'static str = "metadata";

    type Config = MetadataConfig;
}

impl MetadataService {
    pub fn new(bundle: MetadataBundle) -> Self {
        Self { bundle }
    }

    /// Reads and validates every document. Any failure is fatal for the caller.
    pub fn load(config: &MetadataConfig, image_info: &Path) -> Result<Self, MetadataError> {
        let bundle = MetadataBundle {
            training_stats: TrainingStats {
                init: read_document("training history", &config.history)?,
                tuning: read_document("fine-tuning history", &config.history_fine_tune)?,
            },
            image_stats: read_document("image info", image_info)?,
            test_results: read_document("test results", &config.test_results)?,
        };
        Ok(Self::new(bundle))
    }

    pub fn get_stats(&self) -> &MetadataBundle {
        &self.bundle
    }
}

fn read_document(name: &'static str, path: &Path) -> Result<Box<RawValue>, MetadataError> {
    let io_error = |source| MetadataError::Io {
        name,
        path: path.to_path_buf(),
        source,
    };

    let path = resolve_path(path).map_err(io_error)?;
    let content = std::fs::read_to_string(&path).map_err(io_error)?;
    let document =
        serde_json::from_str::<Box<RawValue>>(&content).map_err(|source| MetadataError::Parse {
            name,
            path: path.clone(),
            source,
        })?;

    tracing::debug!("loaded the {name} document from {}", path.display());
    Ok(document)
}
