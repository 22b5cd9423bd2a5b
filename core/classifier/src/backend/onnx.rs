use std::ops::Deref;
use std::path::Path;

use anyhow::{bail, Context};
use ndarray::Array4;
use ort::{inputs, Session};

use crate::error::InferenceError;
use crate::model::Model;

/// Commits the process-wide ONNX Runtime environment. Call once before loading a model.
pub fn init_runtime() -> anyhow::Result<()> {
    ort::init()
        .with_name("leafscan-inference")
        .commit()
        .context("failed to initialize the Onnx runtime")?;
    Ok(())
}

pub struct OnnxModel {
    session: Session,
    /// Name of the output holding the class scores.
    output: String,
    classes: Option<usize>,
}

impl OnnxModel {
    pub fn load(path: &Path, intra_threads: Option<usize>) -> anyhow::Result<Self> {
        if !path.exists() {
            bail!("model file {} does not exist", path.display());
        }

        let mut builder = Session::builder()?;
        if let Some(threads) = intra_threads {
            builder = builder.with_intra_threads(threads as _)?;
        }
        let session = builder
            .with_model_from_file(path)
            .with_context(|| format!("failed to load model from {}", path.display()))?;

        if session.inputs.is_empty() {
            bail!("model {} declares no inputs", path.display());
        }
        let (output, classes) = match session.outputs.first() {
            // Dynamic dimensions are reported as -1.
            Some(output) => (
                output.name.clone(),
                output
                    .output_type
                    .tensor_dimensions()
                    .and_then(|dims| dims.last())
                    .and_then(|&dim| usize::try_from(dim).ok())
                    .filter(|&dim| dim > 0),
            ),
            None => bail!("model {} declares no outputs", path.display()),
        };

        tracing::info!(
            "loaded model {} (input {:?}, output {:?}, {} classes)",
            path.display(),
            session.inputs[0].name,
            output,
            classes.map_or_else(|| "dynamic".to_string(), |n| n.to_string())
        );

        Ok(Self {
            session,
            output,
            classes,
        })
    }
}

impl Model for OnnxModel {
    fn infer(&self, batch: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let batch = batch.into_dyn();
        let outputs = self.session.run(inputs![batch.view()]?)?;

        let value = outputs
            .get(self.output.as_str())
            .ok_or_else(|| InferenceError::MissingOutput(self.output.clone()))?;
        let scores = value.extract_tensor::<f32>()?.view().deref().to_owned();

        // The output is a (1, classes) row for our batch of one.
        Ok(scores.into_iter().collect())
    }

    fn classes(&self) -> Option<usize> {
        self.classes
    }
}
