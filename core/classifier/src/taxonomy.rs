use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LabelError;

/// The label document shipped next to the model.
///
/// Entry `i` of `map` is the `(category, disease)` coordinate of the model's
/// output index `i`. Any other field of the document is ignored here.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ImageInfo {
    pub map: Vec<(usize, usize)>,
    pub categories: Vec<Category>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Category {
    pub name: String,
    pub diseases: Vec<Disease>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Disease {
    pub name: String,
}

/// Display names for every model output index, resolved once.
#[derive(Debug, Clone)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    pub fn new(info: &ImageInfo) -> Result<Self, LabelError> {
        let labels = info
            .map
            .iter()
            .enumerate()
            .map(|(index, &(category, disease))| {
                let entry = info
                    .categories
                    .get(category)
                    .ok_or(LabelError::UnknownCategory { index, category })?;
                let leaf = entry
                    .diseases
                    .get(disease)
                    .ok_or(LabelError::UnknownDisease {
                        index,
                        category,
                        disease,
                    })?;
                Ok(format!("{} {}", entry.name, leaf.name))
            })
            .collect::<Result<Vec<_>, LabelError>>()?;

        Ok(Self { labels })
    }

    pub fn from_json(content: &str) -> Result<Self, LabelError> {
        let info: ImageInfo = serde_json::from_str(content)?;
        Self::new(&info)
    }

    pub fn load(path: &Path) -> Result<Self, LabelError> {
        let content = fs::read_to_string(path).map_err(|source| LabelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn get(&self, index: usize) -> Result<&str, LabelError> {
        self.labels
            .get(index)
            .map(String::as_str)
            .ok_or(LabelError::UnknownClass(index))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
