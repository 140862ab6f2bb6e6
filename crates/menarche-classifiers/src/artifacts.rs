//! On-disk artifacts of a run.
//!
//! Layout of an artifact directory:
//!
//! ```text
//! manifest.json          run info, feature schema, model list, metrics
//! encoders.json          categorical encoders
//! scaler.json            training-partition scaler
//! models/<name>.json     one fitted classifier per file
//! ```
//!
//! Every file is an [`ArtifactEnvelope`] tagged with the run id and the
//! format version, so files from different runs cannot be combined.
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{MenarcheError, Result};
use crate::models::Classifier;
use crate::pipeline::StudyResult;
use crate::preprocessing::{EncoderSet, Scaler};
use crate::report::{MetricsTable, RankMetric};
use crate::run_info::RunInfo;
use crate::schema::FeatureSchema;

pub const FORMAT_VERSION: u32 = 1;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const ENCODERS_FILE: &str = "encoders.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const MODELS_DIR: &str = "models";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEnvelope<T> {
    pub run_id: String,
    pub format_version: u32,
    pub payload: T,
}

#[derive(Deserialize)]
struct EnvelopeHeader {
    run_id: String,
    format_version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub kind: String,
    /// Path relative to the artifact directory.
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub run: RunInfo,
    pub schema: FeatureSchema,
    pub models: Vec<ModelEntry>,
    pub best_model: Option<String>,
    pub metrics: MetricsTable,
}

impl Manifest {
    pub fn run_id(&self) -> &str {
        &self.run.run_id
    }

    pub fn model(&self, name: &str) -> Option<&ModelEntry> {
        self.models.iter().find(|m| m.name == name)
    }
}

fn model_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn write_envelope<T: Serialize>(path: &Path, run_id: &str, payload: &T) -> Result<()> {
    let envelope = ArtifactEnvelope {
        run_id: run_id.to_string(),
        format_version: FORMAT_VERSION,
        payload,
    };
    let bytes = serde_json::to_vec_pretty(&envelope)?;
    fs::write(path, bytes).map_err(|e| MenarcheError::io(path, e))?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

fn read_envelope<T: DeserializeOwned>(path: &Path, expected_run: Option<&str>) -> Result<ArtifactEnvelope<T>> {
    let text = fs::read_to_string(path).map_err(|e| MenarcheError::io(path, e))?;

    let header: EnvelopeHeader = serde_json::from_str(&text)?;
    if header.format_version != FORMAT_VERSION {
        return Err(MenarcheError::IncompatibleArtifactVersion {
            path: path.to_path_buf(),
            expected: FORMAT_VERSION,
            found: header.format_version,
        });
    }
    if let Some(expected) = expected_run {
        if header.run_id != expected {
            return Err(MenarcheError::ArtifactMismatch {
                path: path.to_path_buf(),
                expected: expected.to_string(),
                found: header.run_id,
            });
        }
    }

    Ok(serde_json::from_str(&text)?)
}

/// Persist the fitted preprocessing, every fitted model and the manifest.
///
/// Models that failed during evaluation are listed in the metrics table
/// but have no model file.
pub fn save_artifacts<P: AsRef<Path>>(
    dir: P,
    result: &StudyResult,
    rank_by: RankMetric,
) -> Result<Manifest> {
    let dir = dir.as_ref();
    let models_dir = dir.join(MODELS_DIR);
    fs::create_dir_all(&models_dir).map_err(|e| MenarcheError::io(&models_dir, e))?;

    let prepared = &result.prepared;
    let run_id = prepared.run.run_id.as_str();

    write_envelope(&dir.join(ENCODERS_FILE), run_id, &prepared.encoders)?;
    write_envelope(&dir.join(SCALER_FILE), run_id, &prepared.scaler)?;

    let mut entries: Vec<ModelEntry> = Vec::new();
    for evaluated in &result.models {
        let classifier = match &evaluated.classifier {
            Some(classifier) => classifier,
            None => continue,
        };
        let stem = model_file_stem(&evaluated.config.name);
        let mut file = format!("{}/{}.json", MODELS_DIR, stem);
        // distinct names can sanitize to the same stem
        if entries.iter().any(|e| e.file == file) {
            file = format!("{}/{}_{}.json", MODELS_DIR, stem, entries.len());
        }
        write_envelope(&dir.join(&file), run_id, classifier)?;
        entries.push(ModelEntry {
            name: evaluated.config.name.clone(),
            kind: evaluated.config.model_type.kind().to_string(),
            file,
        });
    }

    let mut metrics = result.table.clone();
    metrics.sort_by(rank_by, true);
    let manifest = Manifest {
        run: prepared.run.clone(),
        schema: prepared.schema.clone(),
        models: entries,
        best_model: metrics.best(rank_by).map(|r| r.model.clone()),
        metrics,
    };
    write_envelope(&dir.join(MANIFEST_FILE), run_id, &manifest)?;
    log::info!(
        "Saved artifacts of run {} to {}",
        run_id,
        dir.display()
    );
    Ok(manifest)
}

pub fn load_manifest<P: AsRef<Path>>(dir: P) -> Result<Manifest> {
    let path = dir.as_ref().join(MANIFEST_FILE);
    let envelope: ArtifactEnvelope<Manifest> = read_envelope(&path, None)?;
    if envelope.run_id != envelope.payload.run.run_id {
        return Err(MenarcheError::ArtifactMismatch {
            path,
            expected: envelope.payload.run.run_id,
            found: envelope.run_id,
        });
    }
    Ok(envelope.payload)
}

pub fn load_encoders<P: AsRef<Path>>(dir: P, manifest: &Manifest) -> Result<EncoderSet> {
    let path = dir.as_ref().join(ENCODERS_FILE);
    Ok(read_envelope(&path, Some(manifest.run_id()))?.payload)
}

pub fn load_scaler<P: AsRef<Path>>(dir: P, manifest: &Manifest) -> Result<Scaler> {
    let path = dir.as_ref().join(SCALER_FILE);
    let scaler: Scaler = read_envelope(&path, Some(manifest.run_id()))?.payload;
    if scaler.n_features() != manifest.schema.len() {
        return Err(MenarcheError::ShapeMismatch {
            expected: format!("{} scaler features", manifest.schema.len()),
            got: format!("{} scaler features", scaler.n_features()),
        });
    }
    if scaler.std.len() != scaler.mean.len() {
        return Err(MenarcheError::ShapeMismatch {
            expected: format!("{} scaler deviations", scaler.mean.len()),
            got: format!("{} scaler deviations", scaler.std.len()),
        });
    }
    Ok(scaler)
}

/// Load one fitted classifier listed in the manifest.
pub fn load_classifier<P: AsRef<Path>>(dir: P, manifest: &Manifest, name: &str) -> Result<Classifier> {
    let entry = manifest
        .model(name)
        .ok_or_else(|| MenarcheError::InvalidConfig {
            reason: format!(
                "model '{}' is not part of run {}; available: {}",
                name,
                manifest.run_id(),
                manifest
                    .models
                    .iter()
                    .map(|m| m.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })?;
    let path: PathBuf = dir.as_ref().join(&entry.file);
    Ok(read_envelope(&path, Some(manifest.run_id()))?.payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_file_names_are_sanitized() {
        assert_eq!(model_file_stem("gbdt small/v2"), "gbdt_small_v2");
        assert_eq!(model_file_stem("svm-rbf_1"), "svm-rbf_1");
    }

    #[test]
    fn version_mismatch_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SCALER_FILE);
        fs::write(
            &path,
            r#"{"run_id": "r", "format_version": 99, "payload": {"mean": [], "std": []}}"#,
        )
        .unwrap();
        let err = read_envelope::<Scaler>(&path, Some("r")).unwrap_err();
        assert!(matches!(
            err,
            MenarcheError::IncompatibleArtifactVersion { found: 99, .. }
        ));
    }

    #[test]
    fn run_mismatch_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SCALER_FILE);
        write_envelope(&path, "run-a", &Scaler { mean: vec![0.0], std: vec![1.0] }).unwrap();
        assert!(read_envelope::<Scaler>(&path, Some("run-a")).is_ok());
        assert!(matches!(
            read_envelope::<Scaler>(&path, Some("run-b")),
            Err(MenarcheError::ArtifactMismatch { .. })
        ));
    }
}
