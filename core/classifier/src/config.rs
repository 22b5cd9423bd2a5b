use std::path::PathBuf;
use std::time::Duration;

use leafscan_utils::config::LEAFSCAN_HOME_DIR;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ClassifierConfig {
    /// The ONNX model artifact.
    pub model: PathBuf,
    /// The label map and category taxonomy document.
    pub image_info: PathBuf,
    /// Number of threads used to parallelize a single inference. Left to the runtime when unset.
    pub intra_threads: Option<usize>,
    pub images: ImageSourceConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: LEAFSCAN_HOME_DIR.join("image_model.onnx"),
            image_info: LEAFSCAN_HOME_DIR.join("image_info.json"),
            intra_threads: None,
            images: Default::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ImageSourceConfig {
    /// Whether `http` and `https` references are fetched.
    pub allow_remote: bool,
    #[serde(with = "humantime_serde")]
    pub fetch_timeout: Duration,
    pub max_image_bytes: usize,
}

impl Default for ImageSourceConfig {
    fn default() -> Self {
        Self {
            allow_remote: true,
            fetch_timeout: Duration::from_secs(10),
            max_image_bytes: 16 << 20,
        }
    }
}
