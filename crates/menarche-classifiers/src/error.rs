use std::path::PathBuf;

/// Errors raised by the preprocessing, evaluation and artifact layers.
#[derive(Debug, thiserror::Error)]
pub enum MenarcheError {
    /// A required column is absent from the input header.
    #[error("missing required column '{column}'")]
    MissingColumn { column: String },

    /// The input table is structurally unusable (duplicate headers, ragged rows, ...).
    #[error("invalid input schema: {reason}")]
    InvalidSchema { reason: String },

    /// A cell is empty or holds a missing-value marker.
    #[error("missing value in column '{column}' at row {row}")]
    MissingValue { row: usize, column: String },

    /// A cell could not be interpreted for its column kind.
    #[error("invalid value '{value}' in column '{column}' at row {row}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    /// A categorical value that was not observed when the encoder was fitted.
    #[error("value '{value}' is not in the vocabulary of column '{column}'")]
    UnknownCategory { column: String, value: String },

    /// An integer code outside the encoder's range.
    #[error("code {code} is out of range for column '{column}'")]
    UnknownCode { column: String, code: usize },

    /// A column name that has no encoder or no schema entry.
    #[error("unknown column '{column}'")]
    UnknownColumn { column: String },

    #[error("dataset has zero rows")]
    EmptyDataset,

    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    #[error("invalid train/test split: {reason}")]
    InvalidSplit { reason: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("model '{model}' failed to fit: {reason}")]
    ModelFit { model: String, reason: String },

    #[error("model '{model}' failed to predict: {reason}")]
    ModelPredict { model: String, reason: String },

    #[error("model '{model}' has not been fitted")]
    ModelNotFitted { model: String },

    /// Every model of an evaluation run failed.
    #[error("all {count} models failed during evaluation")]
    AllModelsFailed { count: usize },

    /// Artifacts written by different pipeline runs were mixed.
    #[error("artifact {path} belongs to run {found}, expected run {expected}")]
    ArtifactMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("incompatible artifact version in {path}: expected {expected}, found {found}")]
    IncompatibleArtifactVersion {
        path: PathBuf,
        expected: u32,
        found: u32,
    },

    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MenarcheError>;

impl MenarcheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MenarcheError::Io {
            path: path.into(),
            source,
        }
    }
}
