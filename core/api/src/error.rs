use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use leafscan_classifier::{ImageError, PredictError};
use thiserror::Error;
use tracing::{error, warn};

use crate::types::{ErrorResponse, Status};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Predict(#[from] PredictError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Predict(PredictError::Image(e)) => match e {
                ImageError::NotFound(_) => StatusCode::NOT_FOUND,
                ImageError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                ImageError::Decode(_)
                | ImageError::PalettePng
                | ImageError::ShapeMismatch { .. }
                | ImageError::Shape(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ImageError::Fetch { .. } | ImageError::FetchStatus { .. } => {
                    StatusCode::BAD_GATEWAY
                },
                ImageError::EmptyReference
                | ImageError::InvalidEncoding(_)
                | ImageError::InvalidReference(_)
                | ImageError::RemoteDisabled
                | ImageError::NotAFile(_)
                | ImageError::Io { .. } => StatusCode::BAD_REQUEST,
            },
            Self::Predict(PredictError::Inference(_) | PredictError::Label(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.status_code();
        let message = self.to_string();

        let status = if code.is_server_error() {
            error!("failed to handle request: {message}");
            Status::Error
        } else {
            warn!("rejected request: {message}");
            Status::Fail
        };

        (code, Json(ErrorResponse { status, message })).into_response()
    }
}
