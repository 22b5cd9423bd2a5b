use ndarray::Array4;

use crate::error::InferenceError;

/// A loaded classification network.
///
/// Implementations are shared across requests, so `infer` must be safe to call
/// concurrently.
pub trait Model: Send + Sync + 'static {
    /// Runs a forward pass over a batch of one image and returns the raw score
    /// of every class, in output index order.
    fn infer(&self, batch: Array4<f32>) -> Result<Vec<f32>, InferenceError>;

    /// Number of classes the model scores, when its signature fixes it.
    fn classes(&self) -> Option<usize> {
        None
    }
}
