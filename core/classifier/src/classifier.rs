use std::sync::Arc;

use anyhow::Context;
use leafscan_utils::config::{resolve_path, ConfigConsumer};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::onnx::OnnxModel;
use crate::config::ClassifierConfig;
use crate::error::{InferenceError, LabelError, PredictError};
use crate::model::Model;
use crate::rank::{self, Ranked};
use crate::source::{ImageReference, ImageSource};
use crate::taxonomy::LabelTable;
use crate::tensor;

/// One ranked guess.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Prediction {
    pub name: String,
    pub percent: f32,
}

/// The inference service: image reference in, two ranked labels out.
pub struct Classifier {
    model: Arc<dyn Model>,
    labels: LabelTable,
    source: ImageSource,
}

impl ConfigConsumer for Classifier {
    const KEY: &'static str = "classifier";

    type Config = ClassifierConfig;
}

impl Classifier {
    pub fn new(model: Arc<dyn Model>, labels: LabelTable, source: ImageSource) -> Self {
        Self {
            model,
            labels,
            source,
        }
    }

    /// Loads the ONNX model and the label table named by the config.
    pub fn load(config: &ClassifierConfig) -> anyhow::Result<Self> {
        let labels_path = resolve_path(&config.image_info)?;
        let labels = LabelTable::load(&labels_path)
            .with_context(|| format!("failed to load labels from {}", labels_path.display()))?;
        tracing::info!("loaded {} labels", labels.len());

        let model_path = resolve_path(&config.model)?;
        let model = OnnxModel::load(&model_path, config.intra_threads)?;
        check_classes(&model, &labels)?;

        let source = ImageSource::new(config.images.clone())?;
        Ok(Self::new(Arc::new(model), labels, source))
    }

    /// Classifies the image behind a percent-encoded reference.
    pub async fn predict(&self, reference: &str) -> Result<[Prediction; 2], PredictError> {
        let reference = ImageReference::parse(reference)?;
        debug!("predicting {reference:?}");

        let data = self.source.load(&reference).await?;

        let model = self.model.clone();
        let scores = tokio::task::spawn_blocking(move || -> Result<Vec<f32>, PredictError> {
            let batch = tensor::decode_image(&data)?;
            Ok(model.infer(batch)?)
        })
        .await
        .map_err(|e| InferenceError::Task(e.to_string()))??;

        self.rank(&scores)
    }

    /// Picks the two best classes out of raw model scores and names them.
    pub fn rank(&self, scores: &[f32]) -> Result<[Prediction; 2], PredictError> {
        let [first, second] = rank::top_two(scores)?;
        Ok([self.label(first)?, self.label(second)?])
    }

    fn label(&self, ranked: Ranked) -> Result<Prediction, PredictError> {
        Ok(Prediction {
            name: self.labels.get(ranked.index)?.to_string(),
            percent: ranked.percent,
        })
    }
}

/// Fails when the model's declared output width disagrees with the label map.
fn check_classes(model: &dyn Model, labels: &LabelTable) -> Result<(), LabelError> {
    match model.classes() {
        Some(classes) if classes != labels.len() => Err(LabelError::ClassCountMismatch {
            model: classes,
            labels: labels.len(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
    use ndarray::Array4;
    use pretty_assertions::assert_eq;

    use std::path::Path;

    use super::*;
    use crate::config::ImageSourceConfig;
    use crate::error::ImageError;

    const IMAGE_INFO: &str = r#"{
        "map": [[0, 0], [0, 1], [1, 0]],
        "categories": [
            {"name": "Leaf", "diseases": [{"name": "Healthy"}, {"name": "Blight"}]},
            {"name": "Stem", "diseases": [{"name": "Rot"}]}
        ]
    }"#;

    /// Returns the same scores for every image, after checking the batch shape.
    struct FixedModel(Vec<f32>);

    impl Model for FixedModel {
        fn infer(&self, batch: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
            assert_eq!(batch.shape(), &[1, 256, 256, 3]);
            Ok(self.0.clone())
        }
    }

    /// Declares a class count without ever being run.
    struct DeclaredModel(usize);

    impl Model for DeclaredModel {
        fn infer(&self, _: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
            unreachable!()
        }

        fn classes(&self) -> Option<usize> {
            Some(self.0)
        }
    }

    fn classifier(scores: Vec<f32>) -> Classifier {
        Classifier::new(
            Arc::new(FixedModel(scores)),
            LabelTable::from_json(IMAGE_INFO).unwrap(),
            ImageSource::new(ImageSourceConfig::default()).unwrap(),
        )
    }

    fn write_png(dir: &std::path::Path, name: &str, size: u32) -> String {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(size, size, Rgb([10, 20, 30])));
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        let path = dir.join(name);
        std::fs::write(&path, buffer).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn predict_names_the_two_best_classes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "leaf.png", 256);

        let result = classifier(vec![0.1, 0.7, 0.2]).predict(&path).await.unwrap();
        assert_eq!(
            result,
            [
                Prediction {
                    name: "Leaf Blight".into(),
                    percent: 70.0
                },
                Prediction {
                    name: "Stem Rot".into(),
                    percent: 20.0
                },
            ]
        );
    }

    #[tokio::test]
    async fn predict_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "leaf.png", 256);

        let classifier = classifier(vec![0.3, 0.3, 0.4]);
        let first = classifier.predict(&path).await.unwrap();
        let second = classifier.predict(&path).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].name, "Stem Rot");
        assert_eq!(first[1].name, "Leaf Healthy");
    }

    #[tokio::test]
    async fn predict_decodes_the_reference() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "my leaf.png", 256);
        let encoded = urlencoding::encode(&path).into_owned();

        let result = classifier(vec![0.1, 0.7, 0.2]).predict(&encoded).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn predict_rejects_small_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "small.png", 128);

        let err = classifier(vec![0.1, 0.7, 0.2])
            .predict(&path)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PredictError::Image(ImageError::ShapeMismatch { width: 128, .. })
        ));
    }

    #[tokio::test]
    async fn predict_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nothing.png");

        let err = classifier(vec![0.1, 0.7, 0.2])
            .predict(&path.to_string_lossy())
            .await
            .unwrap_err();
        assert!(matches!(err, PredictError::Image(ImageError::NotFound(_))));
    }

    #[test]
    fn rank_with_more_scores_than_labels() {
        let err = classifier(vec![]).rank(&[0.1, 0.1, 0.1, 0.7]).unwrap_err();
        assert!(matches!(
            err,
            PredictError::Label(LabelError::UnknownClass(3))
        ));
    }

    #[test]
    fn label_map_must_cover_every_model_class() {
        let labels = LabelTable::from_json(IMAGE_INFO).unwrap();

        check_classes(&DeclaredModel(3), &labels).unwrap();
        check_classes(&FixedModel(vec![]), &labels).unwrap();

        let err = check_classes(&DeclaredModel(4), &labels).unwrap_err();
        assert!(matches!(
            err,
            LabelError::ClassCountMismatch {
                model: 4,
                labels: 3
            }
        ));
    }

    #[test]
    fn load_rejects_a_model_wider_than_the_label_map() {
        let dir = tempfile::tempdir().unwrap();
        let image_info = dir.path().join("image_info.json");
        std::fs::write(
            &image_info,
            r#"{"map": [[0, 0], [0, 1]], "categories": [{"name": "Leaf", "diseases": [{"name": "Healthy"}, {"name": "Blight"}]}]}"#,
        )
        .unwrap();

        let config = ClassifierConfig {
            model: Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/tiny_classifier.onnx"),
            image_info,
            ..Default::default()
        };
        let err = Classifier::load(&config).err().unwrap();
        assert!(err.to_string().contains("3 output classes"), "{err:#}");

        let config = ClassifierConfig {
            image_info: {
                let path = dir.path().join("three.json");
                std::fs::write(&path, IMAGE_INFO).unwrap();
                path
            },
            ..config
        };
        assert_eq!(Classifier::load(&config).unwrap().labels.len(), 3);
    }
}
