mod backend;
mod classifier;
pub mod config;
mod error;
pub mod model;
pub mod rank;
pub mod source;
pub mod taxonomy;
pub mod tensor;

pub use backend::onnx::{init_runtime, OnnxModel};
pub use classifier::{Classifier, Prediction};
pub use config::{ClassifierConfig, ImageSourceConfig};
pub use error::{ImageError, InferenceError, LabelError, PredictError};
pub use model::Model;
pub use source::{ImageReference, ImageSource};
pub use taxonomy::{Category, Disease, ImageInfo, LabelTable};
