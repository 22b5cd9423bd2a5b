use std::path::PathBuf;

use leafscan_utils::config::LEAFSCAN_HOME_DIR;
use serde::{Deserialize, Serialize};

/// Locations of the training reports. The label document is shared with the
/// classifier and configured there.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct MetadataConfig {
    pub history: PathBuf,
    pub history_fine_tune: PathBuf,
    pub test_results: PathBuf,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            history: LEAFSCAN_HOME_DIR.join("history.json"),
            history_fine_tune: LEAFSCAN_HOME_DIR.join("history_fine_tune.json"),
            test_results: LEAFSCAN_HOME_DIR.join("test_results.json"),
        }
    }
}
