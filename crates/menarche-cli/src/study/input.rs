use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use menarche_classifiers::config::{ModelConfig, ModelType, PipelineConfig};
use menarche_classifiers::report::RankMetric;

use crate::util::validate_tsv_or_csv_file;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StudyConfig {
    pub data_path: String,
    pub output_dir: String,
    pub pipeline: PipelineConfig,
    pub models: Vec<ModelConfig>,
    pub rank_by: RankMetric,
    pub report: bool,
}

impl Default for StudyConfig {
    fn default() -> Self {
        StudyConfig {
            data_path: String::new(),
            output_dir: String::from("menarche_study"),
            pipeline: PipelineConfig::default(),
            models: ModelConfig::default_suite(),
            rank_by: RankMetric::default(),
            report: true,
        }
    }
}

/// Load a study configuration from a JSON file. Missing fields take their
/// default value.
pub fn load_study_config<P: AsRef<Path>>(path: P) -> Result<StudyConfig> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
    let config: StudyConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
    Ok(config)
}

impl StudyConfig {
    pub fn from_arguments<P: AsRef<Path>>(config_path: P, matches: &ArgMatches) -> Result<Self> {
        let mut config = load_study_config(config_path)?;
        config.apply_overrides(matches)?;
        Ok(config)
    }

    /// Apply CLI overrides and check the input file.
    pub fn apply_overrides(&mut self, matches: &ArgMatches) -> Result<()> {
        if let Some(data) = matches.get_one::<String>("data") {
            self.data_path = data.clone();
        }
        validate_tsv_or_csv_file(&self.data_path)?;

        if let Some(output_dir) = matches.get_one::<String>("output_dir") {
            self.output_dir = output_dir.clone();
        }

        if let Some(seed) = matches.get_one::<u64>("seed") {
            self.pipeline.split.seed = *seed;
        }

        if let Some(model_type) = matches.get_one::<String>("model_type") {
            let model_type = ModelType::from_str(model_type).map_err(anyhow::Error::msg)?;
            self.models = vec![ModelConfig::from(model_type)];
        }

        if let Some(rank_by) = matches.get_one::<String>("rank_by") {
            self.rank_by = RankMetric::from_str(rank_by).map_err(anyhow::Error::msg)?;
        }

        if matches.get_flag("parallel") {
            self.pipeline.parallel = true;
        }

        if matches.get_flag("no_report") {
            self.report = false;
        }

        Ok(())
    }
}
