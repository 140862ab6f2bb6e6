//! Single-record prediction from the artifacts of one run.
use std::collections::BTreeMap;
use std::path::Path;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::artifacts::{load_classifier, load_encoders, load_manifest, load_scaler, Manifest};
use crate::error::{MenarcheError, Result};
use crate::models::{Classifier, ClassifierModel};
use crate::preprocessing::{assemble_record, EncoderSet, Scaler, EARLY_LABEL};
use crate::schema::FeatureSchema;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The record cannot be scored: unknown category, missing field or a
    /// value that does not parse.
    #[error("record rejected: {reason}")]
    Rejected { reason: String },

    #[error(transparent)]
    Internal(#[from] MenarcheError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub class: u8,
    pub label: String,
    pub model: String,
    pub run_id: String,
}

/// Human readable name of a predicted class.
pub fn class_label(class: u8) -> &'static str {
    if class == EARLY_LABEL {
        "≤12 years"
    } else {
        ">12 years"
    }
}

/// Fitted encoders, scaler and one classifier of the same run.
pub struct InferenceContext {
    manifest: Manifest,
    encoders: EncoderSet,
    scaler: Scaler,
    classifier: Classifier,
    model: String,
}

impl InferenceContext {
    /// Load a run's artifacts. Without `model` the best ranked model of
    /// the run is used.
    pub fn from_artifacts<P: AsRef<Path>>(dir: P, model: Option<&str>) -> Result<Self> {
        let dir = dir.as_ref();
        let manifest = load_manifest(dir)?;
        let model = match model {
            Some(name) => name.to_string(),
            None => manifest
                .best_model
                .clone()
                .ok_or_else(|| MenarcheError::InvalidConfig {
                    reason: format!("run {} has no fitted model", manifest.run_id()),
                })?,
        };

        let encoders = load_encoders(dir, &manifest)?;
        let scaler = load_scaler(dir, &manifest)?;
        let classifier = load_classifier(dir, &manifest, &model)?;
        log::info!(
            "Loaded model '{}' of run {} from {}",
            model,
            manifest.run_id(),
            dir.display()
        );

        Ok(InferenceContext {
            manifest,
            encoders,
            scaler,
            classifier,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn run_id(&self) -> &str {
        self.manifest.run_id()
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.manifest.schema
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Encode, scale and classify one record given as column -> raw value.
    ///
    /// Columns outside the schema are ignored.
    pub fn predict(&self, record: &BTreeMap<String, String>) -> std::result::Result<Prediction, InferenceError> {
        let features = assemble_record(record, self.schema(), &self.encoders).map_err(|e| match e {
            MenarcheError::UnknownCategory { .. }
            | MenarcheError::MissingValue { .. }
            | MenarcheError::InvalidValue { .. } => InferenceError::Rejected {
                reason: e.to_string(),
            },
            other => InferenceError::Internal(other),
        })?;

        let scaled = self.scaler.transform_row(&features)?;
        let n_features = scaled.len();
        let x = Array2::from_shape_vec((1, n_features), scaled).map_err(|e| {
            MenarcheError::ShapeMismatch {
                expected: format!("(1, {})", n_features),
                got: e.to_string(),
            }
        })?;

        let class = self
            .classifier
            .predict(&x)?
            .first()
            .copied()
            .ok_or_else(|| MenarcheError::ModelPredict {
                model: self.model.clone(),
                reason: "no prediction returned".to_string(),
            })?;

        Ok(Prediction {
            class,
            label: class_label(class).to_string(),
            model: self.model.clone(),
            run_id: self.run_id().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(class_label(1), "≤12 years");
        assert_eq!(class_label(0), ">12 years");
    }
}
