//! Fit, predict and score every configured model on one partition.
use std::any::Any;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use rayon::prelude::*;

use crate::config::ModelConfig;
use crate::data_handling::TrainTest;
use crate::error::{MenarcheError, Result};
use crate::metrics::BinaryMetrics;
use crate::models::{build_model, Classifier, ClassifierModel};
use crate::report::{MetricsRecord, ModelFailure};

/// Result of evaluating one model.
#[derive(Debug, Clone)]
pub enum ModelOutcome {
    Evaluated(MetricsRecord),
    Failed { model: String, reason: String },
}

impl ModelOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ModelOutcome::Failed { .. })
    }
}

/// Outcome of one model plus the fitted classifier when fitting succeeded.
pub struct EvaluatedModel {
    pub config: ModelConfig,
    pub outcome: ModelOutcome,
    pub classifier: Option<Classifier>,
}

/// Model names must be unique and non-empty.
pub fn validate_model_configs(configs: &[ModelConfig]) -> Result<()> {
    if configs.is_empty() {
        return Err(MenarcheError::InvalidConfig {
            reason: "no models configured".to_string(),
        });
    }
    let mut seen = HashSet::new();
    for config in configs {
        if !seen.insert(config.name.as_str()) {
            return Err(MenarcheError::InvalidConfig {
                reason: format!("duplicate model name '{}'", config.name),
            });
        }
    }
    Ok(())
}

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}

fn fit_and_score(data: &TrainTest, config: &ModelConfig) -> Result<(MetricsRecord, Classifier)> {
    let mut classifier = build_model(config)?;

    // Third-party learners may panic on degenerate input instead of returning an error.
    let start = Instant::now();
    catch_unwind(AssertUnwindSafe(|| {
        classifier.fit(&data.train.x, &data.train.y)
    }))
    .map_err(|payload| MenarcheError::ModelFit {
        model: config.name.clone(),
        reason: panic_reason(payload),
    })??;
    let fit_seconds = start.elapsed().as_secs_f64();

    let start = Instant::now();
    let predictions = catch_unwind(AssertUnwindSafe(|| classifier.predict(&data.test.x)))
        .map_err(|payload| MenarcheError::ModelPredict {
            model: config.name.clone(),
            reason: panic_reason(payload),
        })??;
    let predict_seconds = start.elapsed().as_secs_f64();

    let y_true = data.test.y.to_vec();
    let (metrics, confusion) = BinaryMetrics::from_labels(&y_true, &predictions)?;
    log::info!(
        "{} ({}) fitted in {:.3}s\n{}",
        config.name,
        config.model_type.kind(),
        fit_seconds,
        confusion.classification_report()
    );

    let record = MetricsRecord {
        model: config.name.clone(),
        kind: config.model_type.kind().to_string(),
        metrics,
        confusion,
        fit_seconds,
        predict_seconds,
    };
    Ok((record, classifier))
}

/// Build, fit on the training partition and score on the test partition.
///
/// Errors are captured in the outcome so one model cannot abort the run.
pub fn evaluate_model(data: &TrainTest, config: &ModelConfig) -> EvaluatedModel {
    match fit_and_score(data, config) {
        Ok((record, classifier)) => EvaluatedModel {
            config: config.clone(),
            outcome: ModelOutcome::Evaluated(record),
            classifier: Some(classifier),
        },
        Err(e) => {
            log::error!("Model '{}' failed: {}", config.name, e);
            EvaluatedModel {
                config: config.clone(),
                outcome: ModelOutcome::Failed {
                    model: config.name.clone(),
                    reason: e.to_string(),
                },
                classifier: None,
            }
        }
    }
}

/// Evaluate every model, in configuration order.
///
/// With `parallel` the models run on the rayon pool; each reads the shared
/// partition only, so results match a sequential run.
pub fn evaluate_models(
    data: &TrainTest,
    configs: &[ModelConfig],
    parallel: bool,
) -> Result<Vec<EvaluatedModel>> {
    validate_model_configs(configs)?;

    let evaluated: Vec<EvaluatedModel> = if parallel {
        configs
            .par_iter()
            .map(|config| evaluate_model(data, config))
            .collect()
    } else {
        configs
            .iter()
            .map(|config| evaluate_model(data, config))
            .collect()
    };

    if evaluated.iter().all(|e| e.outcome.is_failed()) {
        return Err(MenarcheError::AllModelsFailed {
            count: evaluated.len(),
        });
    }
    Ok(evaluated)
}

/// Split outcomes into metric rows and failures.
pub fn collect_outcomes(evaluated: &[EvaluatedModel]) -> (Vec<MetricsRecord>, Vec<ModelFailure>) {
    let mut rows = Vec::new();
    let mut failures = Vec::new();
    for model in evaluated {
        match &model.outcome {
            ModelOutcome::Evaluated(record) => rows.push(record.clone()),
            ModelOutcome::Failed { model, reason } => failures.push(ModelFailure {
                model: model.clone(),
                reason: reason.clone(),
            }),
        }
    }
    (rows, failures)
}
