mod config;
mod service;

pub use config::MetadataConfig;
pub use service::{MetadataBundle, MetadataError, MetadataService, TrainingStats};
