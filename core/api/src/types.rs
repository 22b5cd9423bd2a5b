//! Request and response bodies of the HTTP surface.

use leafscan_classifier::Prediction;
use leafscan_metadata::MetadataBundle;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    /// The request was rejected.
    Fail,
    /// The server failed to handle a valid request.
    Error,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PredictRequest {
    /// Percent-encoded path or URL of the image.
    pub image: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PredictResponse {
    pub results: usize,
    pub status: Status,
    pub data: PredictionData,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PredictionData {
    pub predictions: Vec<Prediction>,
}

impl From<[Prediction; 2]> for PredictResponse {
    fn from(predictions: [Prediction; 2]) -> Self {
        Self {
            results: predictions.len(),
            status: Status::Success,
            data: PredictionData {
                predictions: predictions.into(),
            },
        }
    }
}

#[derive(Serialize, Debug)]
pub struct StatsResponse<'a> {
    pub status: Status,
    pub data: &'a MetadataBundle,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub status: Status,
    pub message: String,
}
