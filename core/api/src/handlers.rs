use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use tracing::debug;

use crate::context::AppContext;
use crate::error::ApiError;
use crate::types::{PredictRequest, PredictResponse};

pub async fn predict(
    Extension(context): Extension<Arc<AppContext>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload?;
    let predictions = context.classifier().predict(&request.image).await?;
    debug!(
        "predicted {:?} ({}) and {:?} ({})",
        predictions[0].name, predictions[0].percent, predictions[1].name, predictions[1].percent
    );
    Ok(Json(predictions.into()))
}

pub async fn stats(Extension(context): Extension<Arc<AppContext>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        context.stats(),
    )
}

pub async fn health() -> &'static str {
    "OK"
}
