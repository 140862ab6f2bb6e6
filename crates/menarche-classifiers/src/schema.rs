//! Column contract of the menarche survey table.
//!
//! The survey file carries six categorical columns, the onset-age column
//! the label is derived from, a cohort column that is never a feature, and
//! any number of numeric feature columns. `FeatureSchema` fixes the order
//! in which features are assembled so that training and inference agree.
use serde::{Deserialize, Serialize};

use crate::error::{MenarcheError, Result};

/// Categorical columns, encoded to dense integer codes.
pub const CATEGORICAL_COLUMNS: [&str; 6] = [
    "Dietary_Pattern",
    "Socioeconomic_Status",
    "Environmental_Factors",
    "Region",
    "Industrialization_Level",
    "Nutrition_Access",
];

/// Source column of the binary label.
pub const AGE_COLUMN: &str = "Menstrual_Onset_Age";

/// Cohort identifier; never a feature.
pub const GENERATION_COLUMN: &str = "Generation";

/// Name of the derived label column.
pub const LABEL_COLUMN: &str = "Menarche_Early";

/// Columns never used as features.
pub const EXCLUDED_COLUMNS: [&str; 3] = [AGE_COLUMN, GENERATION_COLUMN, LABEL_COLUMN];

/// Cell contents treated as a missing value (compared case-insensitively).
pub const MISSING_MARKERS: [&str; 4] = ["na", "n/a", "nan", "null"];

/// Columns that must be present in every input file.
pub fn required_columns() -> Vec<&'static str> {
    let mut columns = CATEGORICAL_COLUMNS.to_vec();
    columns.push(AGE_COLUMN);
    columns.push(GENERATION_COLUMN);
    columns
}

pub fn is_missing(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty()
        || MISSING_MARKERS
            .iter()
            .any(|marker| trimmed.eq_ignore_ascii_case(marker))
}

/// Parse a numeric cell. Boolean literals map to 1/0.
pub fn parse_numeric(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "yes" => return Some(1.0),
        "false" | "no" => return Some(0.0),
        _ => {}
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Categorical,
    Numeric,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureColumn {
    pub name: String,
    pub kind: ColumnKind,
}

/// Ordered feature columns, in input header order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub columns: Vec<FeatureColumn>,
}

impl FeatureSchema {
    /// Derive the feature schema from an input header.
    ///
    /// Excluded columns are dropped, the fixed categorical columns are
    /// tagged categorical and everything else is numeric.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self> {
        for required in required_columns() {
            if !headers.iter().any(|h| h.as_ref() == required) {
                return Err(MenarcheError::MissingColumn {
                    column: required.to_string(),
                });
            }
        }

        let columns = headers
            .iter()
            .map(|h| h.as_ref())
            .filter(|name| !EXCLUDED_COLUMNS.contains(name))
            .map(|name| FeatureColumn {
                name: name.to_string(),
                kind: if CATEGORICAL_COLUMNS.contains(&name) {
                    ColumnKind::Categorical
                } else {
                    ColumnKind::Numeric
                },
            })
            .collect();

        Ok(FeatureSchema { columns })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn categorical(&self) -> impl Iterator<Item = &FeatureColumn> {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Categorical)
    }
}
