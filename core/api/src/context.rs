use bytes::Bytes;
use leafscan_classifier::Classifier;
use leafscan_metadata::MetadataService;

use crate::types::{Status, StatsResponse};

/// Everything a request handler needs, built once before the server starts.
pub struct AppContext {
    classifier: Classifier,
    /// The stats response never changes, so it is serialized up front.
    stats: Bytes,
}

impl AppContext {
    pub fn new(classifier: Classifier, metadata: &MetadataService) -> serde_json::Result<Self> {
        let stats = serde_json::to_vec(&StatsResponse {
            status: Status::Success,
            data: metadata.get_stats(),
        })?;

        Ok(Self {
            classifier,
            stats: stats.into(),
        })
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn stats(&self) -> Bytes {
        self.stats.clone()
    }
}
