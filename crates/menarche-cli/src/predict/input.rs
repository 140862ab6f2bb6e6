use anyhow::{Context, Result};
use clap::ArgMatches;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One prediction request assembled from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictRequest {
    pub artifacts_dir: PathBuf,
    pub model: Option<String>,
    pub record: BTreeMap<String, String>,
}

/// Split a `COLUMN=VALUE` assignment.
pub fn parse_assignment(assignment: &str) -> Result<(String, String)> {
    match assignment.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), value.trim().to_string()))
        }
        _ => anyhow::bail!("Expected COLUMN=VALUE, got: {}", assignment),
    }
}

/// Read a record from a JSON object. Numbers and booleans are kept as
/// their textual form; `null` becomes an empty (missing) value.
pub fn load_record_json<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, String>> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read record file: {}", path.as_ref().display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse record file: {}", path.as_ref().display()))?;
    record_from_json(value)
}

pub fn record_from_json(value: Value) -> Result<BTreeMap<String, String>> {
    let object = match value {
        Value::Object(object) => object,
        _ => anyhow::bail!("A record must be a JSON object of column -> value"),
    };
    object
        .into_iter()
        .map(|(column, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                _ => anyhow::bail!("Column '{}' must hold a scalar value", column),
            };
            Ok((column, text))
        })
        .collect()
}

impl PredictRequest {
    pub fn from_arguments(matches: &ArgMatches) -> Result<Self> {
        let artifacts_dir = matches
            .get_one::<PathBuf>("artifacts")
            .cloned()
            .context("Missing artifact directory")?;
        let model = matches.get_one::<String>("model").cloned();

        let record = if let Some(path) = matches.get_one::<PathBuf>("input") {
            load_record_json(path)?
        } else if let Some(assignments) = matches.get_many::<String>("set") {
            assignments
                .map(|a| parse_assignment(a))
                .collect::<Result<BTreeMap<_, _>>>()?
        } else {
            anyhow::bail!("No record given; pass --input <record.json> or --set COLUMN=VALUE");
        };

        Ok(PredictRequest {
            artifacts_dir,
            model,
            record,
        })
    }
}
