use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::config::{ModelConfig, ModelType};
use crate::error::{MenarcheError, Result};
use crate::models::baseline::MajorityClassifier;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::gbdt::{GBDTClassifier, GbdtParams};
#[cfg(feature = "linfa")]
use crate::models::{
    decision_tree::{parse_split_quality, DecisionTreeClassifier, TreeParams},
    logistic::{LogisticClassifier, LogisticParams},
    naive_bayes::GaussianNbClassifier,
    svm::{SVMClassifier, SvmSettings},
};

/// Closed set of model variants that can take part in a comparison.
///
/// Serialized as an externally tagged enum so a persisted model file
/// records which learner produced it.
#[derive(Serialize, Deserialize)]
pub enum Classifier {
    Majority(MajorityClassifier),
    Gbdt(GBDTClassifier),
    #[cfg(feature = "linfa")]
    LogisticRegression(LogisticClassifier),
    #[cfg(feature = "linfa")]
    DecisionTree(DecisionTreeClassifier),
    #[cfg(feature = "linfa")]
    GaussianNb(GaussianNbClassifier),
    #[cfg(feature = "linfa")]
    Svm(SVMClassifier),
}

impl Classifier {
    fn inner(&self) -> &dyn ClassifierModel {
        match self {
            Classifier::Majority(m) => m,
            Classifier::Gbdt(m) => m,
            #[cfg(feature = "linfa")]
            Classifier::LogisticRegression(m) => m,
            #[cfg(feature = "linfa")]
            Classifier::DecisionTree(m) => m,
            #[cfg(feature = "linfa")]
            Classifier::GaussianNb(m) => m,
            #[cfg(feature = "linfa")]
            Classifier::Svm(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ClassifierModel {
        match self {
            Classifier::Majority(m) => m,
            Classifier::Gbdt(m) => m,
            #[cfg(feature = "linfa")]
            Classifier::LogisticRegression(m) => m,
            #[cfg(feature = "linfa")]
            Classifier::DecisionTree(m) => m,
            #[cfg(feature = "linfa")]
            Classifier::GaussianNb(m) => m,
            #[cfg(feature = "linfa")]
            Classifier::Svm(m) => m,
        }
    }
}

impl ClassifierModel for Classifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<()> {
        self.inner_mut().fit(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>> {
        self.inner().predict(x)
    }

    fn name(&self) -> &str {
        self.inner().name()
    }
}

fn invalid(reason: impl Into<String>) -> MenarcheError {
    MenarcheError::InvalidConfig {
        reason: reason.into(),
    }
}

/// Build an unfitted classifier from a `ModelConfig`.
///
/// Hyper-parameters that no learner could accept are rejected here, before
/// any data is touched.
pub fn build_model(config: &ModelConfig) -> Result<Classifier> {
    let name = config.name.trim();
    if name.is_empty() {
        return Err(invalid("model name must not be empty"));
    }

    match &config.model_type {
        ModelType::MajorityClass {} => Ok(Classifier::Majority(MajorityClassifier::new(name))),

        ModelType::GBDT {
            learning_rate,
            max_depth,
            num_boost_round,
            debug,
            training_optimization_level,
        } => {
            if !(*learning_rate > 0.0) || *max_depth == 0 || *num_boost_round == 0 {
                return Err(invalid(format!(
                    "{}: learning_rate must be positive, max_depth and num_boost_round at least 1",
                    name
                )));
            }
            Ok(Classifier::Gbdt(GBDTClassifier::new(
                name,
                GbdtParams {
                    learning_rate: *learning_rate,
                    max_depth: *max_depth,
                    num_boost_round: *num_boost_round,
                    debug: *debug,
                    training_optimization_level: *training_optimization_level,
                },
            )))
        }

        #[cfg(feature = "linfa")]
        ModelType::LogisticRegression {
            alpha,
            max_iterations,
            gradient_tolerance,
        } => {
            if *alpha < 0.0 || *gradient_tolerance <= 0.0 {
                return Err(invalid(format!(
                    "{}: alpha must be non-negative and gradient_tolerance positive",
                    name
                )));
            }
            Ok(Classifier::LogisticRegression(LogisticClassifier::new(
                name,
                LogisticParams {
                    alpha: *alpha,
                    max_iterations: *max_iterations,
                    gradient_tolerance: *gradient_tolerance,
                },
            )))
        }

        #[cfg(feature = "linfa")]
        ModelType::DecisionTree {
            max_depth,
            split_quality,
        } => {
            parse_split_quality(split_quality)?;
            if *max_depth == Some(0) {
                return Err(invalid(format!("{}: max_depth must be at least 1", name)));
            }
            Ok(Classifier::DecisionTree(DecisionTreeClassifier::new(
                name,
                TreeParams {
                    max_depth: *max_depth,
                    split_quality: split_quality.to_lowercase(),
                },
            )))
        }

        #[cfg(feature = "linfa")]
        ModelType::GaussianNb { var_smoothing } => {
            if *var_smoothing < 0.0 {
                return Err(invalid(format!(
                    "{}: var_smoothing must be non-negative",
                    name
                )));
            }
            Ok(Classifier::GaussianNb(GaussianNbClassifier::new(
                name,
                *var_smoothing,
            )))
        }

        #[cfg(feature = "linfa")]
        ModelType::SVM {
            eps,
            c,
            kernel,
            gaussian_kernel_eps,
            polynomial_kernel_constant,
            polynomial_kernel_degree,
        } => {
            let kernel = kernel.to_lowercase();
            if !matches!(kernel.as_str(), "linear" | "gauss" | "poly") {
                return Err(invalid(format!(
                    "{}: unsupported kernel type: {}. Valid options are: linear, gauss, poly",
                    name, kernel
                )));
            }
            if *eps <= 0.0 || c.0 <= 0.0 || c.1 <= 0.0 {
                return Err(invalid(format!(
                    "{}: eps and both class weights must be positive",
                    name
                )));
            }
            Ok(Classifier::Svm(SVMClassifier::new(
                name,
                SvmSettings {
                    eps: *eps,
                    c: *c,
                    kernel,
                    gaussian_kernel_eps: *gaussian_kernel_eps,
                    polynomial_kernel_constant: *polynomial_kernel_constant,
                    polynomial_kernel_degree: *polynomial_kernel_degree,
                },
            )))
        }
    }
}
