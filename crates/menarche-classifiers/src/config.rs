use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::data_handling::SplitConfig;
use crate::io::MissingValuePolicy;

/// One entry of the model comparison: a unique name plus the variant and
/// its hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub name: String,

    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    /// Always predicts the majority class of the training labels.
    MajorityClass {},
    GBDT {
        learning_rate: f32,
        max_depth: u32,
        num_boost_round: u32,
        debug: bool,
        training_optimization_level: u8,
    },
    #[cfg(feature = "linfa")]
    LogisticRegression {
        alpha: f64,
        max_iterations: u64,
        gradient_tolerance: f64,
    },
    #[cfg(feature = "linfa")]
    DecisionTree {
        max_depth: Option<usize>,
        split_quality: String,
    },
    #[cfg(feature = "linfa")]
    GaussianNb { var_smoothing: f64 },
    #[cfg(feature = "linfa")]
    SVM {
        eps: f64,
        c: (f64, f64),
        kernel: String,
        gaussian_kernel_eps: f64,
        polynomial_kernel_constant: f64,
        polynomial_kernel_degree: f64,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::GBDT {
            learning_rate: 0.1,
            max_depth: 6,
            num_boost_round: 50,
            debug: false,
            training_optimization_level: 2,
        }
    }
}

impl ModelType {
    /// Short lowercase identifier, also used as the default model name.
    pub fn kind(&self) -> &'static str {
        match self {
            ModelType::MajorityClass {} => "majority_class",
            ModelType::GBDT { .. } => "gbdt",
            #[cfg(feature = "linfa")]
            ModelType::LogisticRegression { .. } => "logistic_regression",
            #[cfg(feature = "linfa")]
            ModelType::DecisionTree { .. } => "decision_tree",
            #[cfg(feature = "linfa")]
            ModelType::GaussianNb { .. } => "gaussian_nb",
            #[cfg(feature = "linfa")]
            ModelType::SVM { .. } => "svm",
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "majority_class" | "majority" => Ok(ModelType::MajorityClass {}),
            "gbdt" => Ok(ModelType::default()),
            #[cfg(feature = "linfa")]
            "logistic_regression" | "logistic" => Ok(ModelType::LogisticRegression {
                alpha: 1.0,
                max_iterations: 100,
                gradient_tolerance: 1e-4,
            }),
            #[cfg(feature = "linfa")]
            "decision_tree" | "tree" => Ok(ModelType::DecisionTree {
                max_depth: Some(8),
                split_quality: "gini".to_string(),
            }),
            #[cfg(feature = "linfa")]
            "gaussian_nb" | "naive_bayes" => Ok(ModelType::GaussianNb {
                var_smoothing: 1e-9,
            }),
            #[cfg(feature = "linfa")]
            "svm" => Ok(ModelType::SVM {
                eps: 0.1,
                c: (1.0, 1.0),
                kernel: "gauss".to_string(),
                gaussian_kernel_eps: 10.0,
                polynomial_kernel_constant: 1.0,
                polynomial_kernel_degree: 3.0,
            }),
            _ => Err(format!(
                "Unknown model type: {}. To use logistic_regression, decision_tree, gaussian_nb or svm, please compile with `--features linfa`",
                s
            )),
        }
    }
}

impl ModelConfig {
    pub fn new(name: impl Into<String>, model_type: ModelType) -> Self {
        Self {
            name: name.into(),
            model_type,
        }
    }

    /// Every variant compiled into this build, with default hyper-parameters.
    pub fn default_suite() -> Vec<ModelConfig> {
        let mut kinds = vec!["majority_class", "gbdt"];
        if cfg!(feature = "linfa") {
            kinds.extend(["logistic_regression", "decision_tree", "gaussian_nb", "svm"]);
        }
        kinds
            .into_iter()
            .filter_map(|kind| ModelType::from_str(kind).ok())
            .map(|model_type| ModelConfig::new(model_type.kind(), model_type))
            .collect()
    }
}

impl From<ModelType> for ModelConfig {
    fn from(model_type: ModelType) -> Self {
        ModelConfig::new(model_type.kind(), model_type)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelType::default().into()
    }
}

/// Preprocessing and evaluation settings of one pipeline run.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub split: SplitConfig,
    pub missing_values: MissingValuePolicy,
    /// Evaluate models concurrently. Results are identical to a sequential run.
    pub parallel: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_suite_has_unique_names() {
        let suite = ModelConfig::default_suite();
        assert!(suite.len() >= 2);
        let mut names: Vec<_> = suite.iter().map(|m| m.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), suite.len());
    }

    #[test]
    fn kind_round_trips_through_from_str() {
        for config in ModelConfig::default_suite() {
            let parsed: ModelType = config.model_type.kind().parse().unwrap();
            assert_eq!(parsed, config.model_type);
        }
    }
}
