use std::io;
use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Failures while resolving, loading or decoding the caller's image.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("image reference is empty")]
    EmptyReference,
    #[error("image reference is not valid UTF-8 once decoded")]
    InvalidEncoding(#[from] FromUtf8Error),
    #[error("image reference {0:?} is not a usable location")]
    InvalidReference(String),
    #[error("image not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("{} is not a regular file", .0.display())]
    NotAFile(PathBuf),
    /// The path and cause are logged where the read fails and kept out of
    /// the message, which is returned to clients.
    #[error("image could not be read")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("fetching remote images is disabled")]
    RemoteDisabled,
    #[error("failed to fetch image from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("fetching image from {url} returned status {status}")]
    FetchStatus { url: String, status: u16 },
    #[error("image is larger than the {limit} byte limit")]
    TooLarge { limit: usize },
    #[error("palette-based PNG images are not supported, use RGB")]
    PalettePng,
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error(
        "expected a 256x256 image with 3 channels, got {width}x{height} with {channels} channel(s)"
    )]
    ShapeMismatch { width: u32, height: u32, channels: u8 },
    #[error("failed to reshape image into a batch: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Failures of the model itself, or of what it returned.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("onnx runtime error: {0}")]
    Runtime(#[from] ort::Error),
    #[error("model has no output named {0:?}")]
    MissingOutput(String),
    #[error("model produced {0} score(s), at least 2 are required")]
    TooFewClasses(usize),
    #[error("inference task did not complete: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("failed to read label document {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("label document is invalid: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("label map entry {index} refers to missing category {category}")]
    UnknownCategory { index: usize, category: usize },
    #[error("label map entry {index} refers to missing disease {disease} of category {category}")]
    UnknownDisease {
        index: usize,
        category: usize,
        disease: usize,
    },
    #[error("model output index {0} has no label")]
    UnknownClass(usize),
    #[error("model has {model} output classes but the label map has {labels}")]
    ClassCountMismatch { model: usize, labels: usize },
}

#[derive(Error, Debug)]
pub enum PredictError {
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Label(#[from] LabelError),
}
