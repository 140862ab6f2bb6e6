//! Preprocessing shared by training and inference.
//!
//! Provides categorical encoders, label derivation from the onset age,
//! feature assembly in schema order and a mean/std `Scaler`. Everything
//! fitted here is immutable afterwards and persisted next to the models.
use std::collections::BTreeMap;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::{MenarcheError, Result};
use crate::io::SurveyTable;
use crate::schema::{parse_numeric, ColumnKind, FeatureColumn, FeatureSchema, AGE_COLUMN};

/// Onset ages at or below this value are labelled early (class 1).
pub const EARLY_ONSET_MAX_AGE: f64 = 12.0;

pub const EARLY_LABEL: u8 = 1;
pub const LATE_LABEL: u8 = 0;

/// Maps the distinct values of one categorical column to dense codes.
///
/// Codes follow the lexicographic (byte) order of the observed values, so
/// the same vocabulary always yields the same mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    column: String,
    classes: Vec<String>,
}

impl CategoricalEncoder {
    pub fn fit<'a, I>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut classes: Vec<String> = values.into_iter().map(|v| v.trim().to_string()).collect();
        classes.sort_unstable();
        classes.dedup();
        CategoricalEncoder {
            column: column.to_string(),
            classes,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn encode(&self, value: &str) -> Result<usize> {
        let value = value.trim();
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .map_err(|_| MenarcheError::UnknownCategory {
                column: self.column.clone(),
                value: value.to_string(),
            })
    }

    pub fn decode(&self, code: usize) -> Result<&str> {
        self.classes
            .get(code)
            .map(|s| s.as_str())
            .ok_or_else(|| MenarcheError::UnknownCode {
                column: self.column.clone(),
                code,
            })
    }
}

/// One encoder per categorical column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderSet {
    encoders: BTreeMap<String, CategoricalEncoder>,
}

impl EncoderSet {
    /// Fit an encoder for each listed column from every row of the table.
    pub fn fit<S: AsRef<str>>(table: &SurveyTable, columns: &[S]) -> Result<Self> {
        let mut encoders = BTreeMap::new();
        for column in columns {
            let column = column.as_ref();
            let values = table.column(column)?;
            let encoder = CategoricalEncoder::fit(column, values);
            log::debug!(
                "Encoded column '{}' with {} categories: {:?}",
                column,
                encoder.len(),
                encoder.classes()
            );
            encoders.insert(column.to_string(), encoder);
        }
        Ok(EncoderSet { encoders })
    }

    pub fn get(&self, column: &str) -> Result<&CategoricalEncoder> {
        self.encoders
            .get(column)
            .ok_or_else(|| MenarcheError::UnknownColumn {
                column: column.to_string(),
            })
    }

    pub fn encode(&self, column: &str, value: &str) -> Result<usize> {
        self.get(column)?.encode(value)
    }

    pub fn decode(&self, column: &str, code: usize) -> Result<&str> {
        self.get(column)?.decode(code)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}

/// Binary label for an onset age: 1 (early) iff `age <= 12`.
///
/// Non-finite ages are rejected; the reported row is 0 since no table is involved.
pub fn derive_label(age: f64) -> Result<u8> {
    if !age.is_finite() {
        return Err(MenarcheError::InvalidValue {
            row: 0,
            column: AGE_COLUMN.to_string(),
            value: age.to_string(),
        });
    }
    if age <= EARLY_ONSET_MAX_AGE {
        Ok(EARLY_LABEL)
    } else {
        Ok(LATE_LABEL)
    }
}

/// Derive the label column from the onset-age column of a table.
pub fn derive_labels(table: &SurveyTable) -> Result<Array1<u8>> {
    table
        .column(AGE_COLUMN)?
        .into_iter()
        .enumerate()
        .map(|(row, cell)| {
            cell.trim()
                .parse::<f64>()
                .ok()
                .and_then(|age| derive_label(age).ok())
                .ok_or_else(|| MenarcheError::InvalidValue {
                    row: row + 1,
                    column: AGE_COLUMN.to_string(),
                    value: cell.to_string(),
                })
        })
        .collect()
}

fn encode_cell(
    column: &FeatureColumn,
    cell: &str,
    row: usize,
    encoders: &EncoderSet,
) -> Result<f64> {
    match column.kind {
        ColumnKind::Categorical => encoders.encode(&column.name, cell).map(|code| code as f64),
        ColumnKind::Numeric => parse_numeric(cell).ok_or_else(|| MenarcheError::InvalidValue {
            row,
            column: column.name.clone(),
            value: cell.to_string(),
        }),
    }
}

/// Build the `n x d` feature matrix in schema order.
pub fn assemble_features(
    table: &SurveyTable,
    schema: &FeatureSchema,
    encoders: &EncoderSet,
) -> Result<Array2<f64>> {
    let indices = schema
        .columns
        .iter()
        .map(|c| table.column_index(&c.name))
        .collect::<Result<Vec<_>>>()?;

    let mut values = Vec::with_capacity(table.n_rows() * schema.len());
    for row in 0..table.n_rows() {
        for (column, &idx) in schema.columns.iter().zip(&indices) {
            values.push(encode_cell(column, table.cell(row, idx), row + 1, encoders)?);
        }
    }

    Array2::from_shape_vec((table.n_rows(), schema.len()), values).map_err(|e| {
        MenarcheError::ShapeMismatch {
            expected: format!("({}, {})", table.n_rows(), schema.len()),
            got: e.to_string(),
        }
    })
}

/// Encode a single name -> value record in schema order.
pub fn assemble_record(
    record: &BTreeMap<String, String>,
    schema: &FeatureSchema,
    encoders: &EncoderSet,
) -> Result<Vec<f64>> {
    schema
        .columns
        .iter()
        .map(|column| {
            let cell = record
                .get(&column.name)
                .filter(|v| !crate::schema::is_missing(v))
                .ok_or_else(|| MenarcheError::MissingValue {
                    row: 1,
                    column: column.name.clone(),
                })?;
            encode_cell(column, cell, 1, encoders)
        })
        .collect()
}

/// Per-column standard scaler (mean / population std).
///
/// Statistics are fitted once, on the training partition, and reused
/// unchanged for every later transform. Columns without variance are
/// centred but not divided.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl Scaler {
    /// Below this standard deviation a column is treated as constant.
    pub const MIN_STD: f64 = 1e-9;

    /// Fit from a matrix where rows are samples and columns are features.
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        let (nrows, ncols) = x.dim();
        if nrows == 0 {
            return Err(MenarcheError::EmptyDataset);
        }

        let mut mean = Vec::with_capacity(ncols);
        let mut std = Vec::with_capacity(ncols);
        for c in 0..ncols {
            let column = x.column(c);
            mean.push(column.iter().mean());
            std.push(column.iter().population_std_dev());
        }

        let scaler = Scaler { mean, std };
        for c in scaler.constant_columns() {
            log::warn!(
                "Feature column {} has zero variance; it will be centred but not scaled",
                c
            );
        }
        Ok(scaler)
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn is_constant(&self, col: usize) -> bool {
        self.std[col] < Self::MIN_STD
    }

    pub fn constant_columns(&self) -> Vec<usize> {
        (0..self.n_features()).filter(|&c| self.is_constant(c)).collect()
    }

    fn divisor(&self, col: usize) -> f64 {
        if self.is_constant(col) {
            1.0
        } else {
            self.std[col]
        }
    }

    /// Transform all rows and return a new matrix.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(MenarcheError::ShapeMismatch {
                expected: format!("{} feature columns", self.n_features()),
                got: format!("{} feature columns", x.ncols()),
            });
        }
        let mut out = x.clone();
        for ((_, c), v) in out.indexed_iter_mut() {
            *v = (*v - self.mean[c]) / self.divisor(c);
        }
        Ok(out)
    }

    /// Transform one feature vector (inference path).
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.n_features() {
            return Err(MenarcheError::ShapeMismatch {
                expected: format!("{} features", self.n_features()),
                got: format!("{} features", row.len()),
            });
        }
        Ok(row
            .iter()
            .enumerate()
            .map(|(c, v)| (v - self.mean[c]) / self.divisor(c))
            .collect())
    }
}
