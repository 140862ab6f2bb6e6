//! Delimited survey table reader.
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MenarcheError, Result};
use crate::schema::{is_missing, required_columns, GENERATION_COLUMN};

/// What to do with rows that carry a missing cell in a used column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValuePolicy {
    /// Abort loading with `MissingValue`.
    #[default]
    Reject,
    /// Drop the row and log how many rows were dropped.
    DropRow,
}

/// Configuration for reading survey tables.
#[derive(Debug, Clone, Default)]
pub struct TableReaderConfig {
    /// Field delimiter. When `None` it is chosen from the file extension
    /// (`.tsv` -> tab, anything else -> comma).
    pub delimiter: Option<u8>,
    pub missing_values: MissingValuePolicy,
}

/// Raw survey rows with their header, immutable once loaded.
#[derive(Debug, Clone)]
pub struct SurveyTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SurveyTable {
    /// Build a table, checking for duplicate headers and ragged rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(MenarcheError::InvalidSchema {
                    reason: format!("duplicate column '{}'", header),
                });
            }
        }

        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(MenarcheError::InvalidSchema {
                    reason: format!(
                        "row {} has {} fields, header has {}",
                        row_idx + 1,
                        row.len(),
                        headers.len()
                    ),
                });
            }
        }

        Ok(SurveyTable { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| MenarcheError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// All cells of one column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        &self.rows[row][col]
    }

    /// One row as a column name -> value record.
    pub fn record(&self, row: usize) -> BTreeMap<String, String> {
        self.headers
            .iter()
            .cloned()
            .zip(self.rows[row].iter().cloned())
            .collect()
    }

    /// Keep only the rows whose index is listed, preserving order.
    pub fn select_rows(&self, indices: &[usize]) -> SurveyTable {
        SurveyTable {
            headers: self.headers.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Apply the missing-value policy to every column that feeds the
    /// pipeline (all but the cohort column).
    pub fn apply_missing_policy(self, policy: MissingValuePolicy) -> Result<SurveyTable> {
        let checked: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.as_str() != GENERATION_COLUMN)
            .map(|(i, _)| i)
            .collect();

        let mut keep = Vec::with_capacity(self.rows.len());
        for (row_idx, row) in self.rows.iter().enumerate() {
            let missing = checked.iter().find(|&&c| is_missing(&row[c]));
            match (missing, policy) {
                (None, _) => keep.push(row_idx),
                (Some(&c), MissingValuePolicy::Reject) => {
                    return Err(MenarcheError::MissingValue {
                        row: row_idx + 1,
                        column: self.headers[c].clone(),
                    });
                }
                (Some(_), MissingValuePolicy::DropRow) => {}
            }
        }

        let dropped = self.rows.len() - keep.len();
        if dropped > 0 {
            log::warn!(
                "Dropped {} of {} rows with missing values",
                dropped,
                self.rows.len()
            );
        }
        if dropped == 0 {
            return Ok(self);
        }
        Ok(self.select_rows(&keep))
    }
}

/// Read a survey table with the default configuration.
pub fn read_survey_table<P: AsRef<Path>>(path: P) -> Result<SurveyTable> {
    read_survey_table_with_config(path, &TableReaderConfig::default())
}

/// Read a survey table using a custom configuration.
pub fn read_survey_table_with_config<P: AsRef<Path>>(
    path: P,
    config: &TableReaderConfig,
) -> Result<SurveyTable> {
    let path = path.as_ref();
    let delimiter = config.delimiter.unwrap_or_else(|| delimiter_for(path));
    let file = File::open(path).map_err(|e| MenarcheError::io(path, e))?;
    log::debug!("Reading survey table {}", path.display());
    parse_survey_table(file, delimiter, config.missing_values)
}

/// Parse a survey table from any reader. Validates the column contract.
pub fn parse_survey_table<R: Read>(
    reader: R,
    delimiter: u8,
    missing_values: MissingValuePolicy,
) -> Result<SurveyTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    for required in required_columns() {
        if !headers.iter().any(|h| h == required) {
            return Err(MenarcheError::MissingColumn {
                column: required.to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(|v| v.to_string()).collect::<Vec<_>>());
    }

    let table = SurveyTable::new(headers, rows)?;
    if table.is_empty() {
        return Err(MenarcheError::EmptyDataset);
    }
    table.apply_missing_policy(missing_values)
}

fn delimiter_for(path: &Path) -> u8 {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("tsv") => b'\t',
        _ => b',',
    }
}
