//! Preprocessing followed by the model comparison, as one run.
//!
//! Order: encode -> assemble -> split -> fit scaler on train -> transform
//! both partitions -> evaluate models.
use std::path::Path;

use crate::config::{ModelConfig, PipelineConfig};
use crate::data_handling::{train_test_split, Experiment, Partition, TrainTest};
use crate::error::{MenarcheError, Result};
use crate::evaluation::{collect_outcomes, evaluate_models, validate_model_configs, EvaluatedModel};
use crate::io::{read_survey_table_with_config, SurveyTable, TableReaderConfig};
use crate::preprocessing::{assemble_features, derive_labels, EncoderSet, Scaler};
use crate::report::MetricsTable;
use crate::run_info::RunInfo;
use crate::schema::FeatureSchema;

/// Everything fitted during preprocessing, plus the scaled partitions.
#[derive(Debug, Clone)]
pub struct PreparedStudy {
    pub schema: FeatureSchema,
    pub encoders: EncoderSet,
    pub scaler: Scaler,
    pub partition: Partition,
    pub data: TrainTest,
    pub run: RunInfo,
}

/// Output of a full run.
pub struct StudyResult {
    pub prepared: PreparedStudy,
    pub models: Vec<EvaluatedModel>,
    pub table: MetricsTable,
}

/// Encode, label, split and standardize a survey table.
///
/// Encoders see the whole table; the scaler only sees the training rows.
pub fn prepare(
    table: &SurveyTable,
    config: &PipelineConfig,
    dataset: Option<String>,
) -> Result<PreparedStudy> {
    let schema = FeatureSchema::from_headers(table.headers())?;
    if schema.is_empty() {
        return Err(MenarcheError::InvalidSchema {
            reason: "no feature columns remain after excluding the label columns".to_string(),
        });
    }

    let categorical: Vec<&str> = schema.categorical().map(|c| c.name.as_str()).collect();
    let encoders = EncoderSet::fit(table, &categorical)?;

    let x = assemble_features(table, &schema, &encoders)?;
    let y = derive_labels(table)?;
    let experiment = Experiment::new(x, y, schema.names())?;
    experiment.log_input_data_summary();

    let labels = experiment.y.to_vec();
    let partition = train_test_split(&labels, &config.split)?;
    let (train, test) = experiment.split(&partition)?;
    log::info!(
        "Split {} rows into {} training and {} test rows (seed {})",
        partition.n_rows(),
        partition.train.len(),
        partition.test.len(),
        config.split.seed
    );

    let scaler = Scaler::fit(&train.x)?;
    let data = TrainTest {
        train: train.scaled(&scaler)?,
        test: test.scaled(&scaler)?,
    };

    let run = RunInfo::new(&config.split, &partition, dataset);
    Ok(PreparedStudy {
        schema,
        encoders,
        scaler,
        partition,
        data,
        run,
    })
}

/// Prepare the table and evaluate every model on the resulting partition.
pub fn run_study(
    table: &SurveyTable,
    config: &PipelineConfig,
    models: &[ModelConfig],
    dataset: Option<String>,
) -> Result<StudyResult> {
    validate_model_configs(models)?;

    let prepared = prepare(table, config, dataset)?;
    log::info!(
        "Run {}: evaluating {} models",
        prepared.run.run_id,
        models.len()
    );
    let evaluated = evaluate_models(&prepared.data, models, config.parallel)?;

    let (rows, failures) = collect_outcomes(&evaluated);
    let table = MetricsTable::new(prepared.run.clone(), rows, failures);
    Ok(StudyResult {
        prepared,
        models: evaluated,
        table,
    })
}

/// Read the survey file and run the study on it.
pub fn run_study_from_path<P: AsRef<Path>>(
    path: P,
    config: &PipelineConfig,
    models: &[ModelConfig],
) -> Result<StudyResult> {
    let path = path.as_ref();
    let reader_config = TableReaderConfig {
        delimiter: None,
        missing_values: config.missing_values,
    };
    let table = read_survey_table_with_config(path, &reader_config)?;
    run_study(&table, config, models, Some(path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelType;
    use crate::io::{parse_survey_table, MissingValuePolicy};
    use approx::assert_abs_diff_eq;

    const TABLE: &str = "\
Generation,Dietary_Pattern,Socioeconomic_Status,Environmental_Factors,Region,Industrialization_Level,Nutrition_Access,BMI,Menstrual_Onset_Age
Gen Z,Western,High,Urban,North,High,Good,21.0,11
Millennial,Traditional,Low,Rural,South,Low,Poor,18.5,14
Gen Z,Western,Middle,Urban,East,High,Good,23.1,12
Boomer,Traditional,Low,Rural,West,Low,Poor,19.2,15
Gen Z,Mixed,High,Urban,North,Medium,Good,24.0,10
Millennial,Mixed,Middle,Suburban,South,Medium,Moderate,20.4,13
Boomer,Traditional,Low,Rural,East,Low,Poor,17.9,16
Gen Z,Western,High,Urban,West,High,Good,25.3,11
";

    fn table() -> SurveyTable {
        parse_survey_table(TABLE.as_bytes(), b',', MissingValuePolicy::Reject).unwrap()
    }

    #[test]
    fn leakage_columns_are_not_features() {
        let prepared = prepare(&table(), &PipelineConfig::default(), None).unwrap();
        let names = prepared.schema.names();
        assert_eq!(names.len(), 7);
        assert!(!names.iter().any(|n| n == "Menstrual_Onset_Age" || n == "Generation"));
    }

    #[test]
    fn scaler_is_fitted_on_training_rows_only() {
        let prepared = prepare(&table(), &PipelineConfig::default(), None).unwrap();
        let train = &prepared.data.train;
        assert_eq!(train.n_samples(), 6);
        assert_eq!(prepared.data.test.n_samples(), 2);
        let bmi = prepared.schema.position("BMI").unwrap();
        let column = train.x.column(bmi);
        let mean = column.sum() / column.len() as f64;
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn run_study_ranks_models() {
        let models = vec![ModelConfig::new("baseline", ModelType::MajorityClass {})];
        let result = run_study(&table(), &PipelineConfig::default(), &models, None).unwrap();
        assert_eq!(result.table.rows.len(), 1);
        assert_eq!(result.table.run.run_id, result.prepared.run.run_id);
    }
}
