use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{
    check_fit_inputs, check_predict_inputs, fit_error, fitted, require_both_classes,
    threshold_probabilities, to_signed_labels,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbdtParams {
    pub learning_rate: f32,
    pub max_depth: u32,
    pub num_boost_round: u32,
    pub debug: bool,
    pub training_optimization_level: u8,
}

/// Gradient Boosting Decision Tree (GBDT) classifier
///
/// Uses the log-likelihood loss, so labels are mapped to +1/-1 for
/// training and the predicted probability is thresholded at 0.5.
#[derive(Serialize, Deserialize)]
pub struct GBDTClassifier {
    name: String,
    params: GbdtParams,
    n_features: usize,
    model: Option<GBDT>,
}

impl GBDTClassifier {
    pub fn new(name: impl Into<String>, params: GbdtParams) -> Self {
        GBDTClassifier {
            name: name.into(),
            params,
            n_features: 0,
            model: None,
        }
    }

    fn to_data(x: &Array2<f64>, labels: Option<&[f32]>) -> DataVec {
        x.outer_iter()
            .enumerate()
            .map(|(i, row)| {
                let features = row.iter().map(|&v| v as f32).collect();
                let label = labels.map_or(0.0, |l| l[i]);
                Data::new_training_data(features, 1.0, label, None)
            })
            .collect()
    }

    /// Probability of the early class for each row.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f32>> {
        let model = fitted(&self.name, &self.model)?;
        check_predict_inputs(&self.name, x, self.n_features)?;
        if x.nrows() == 0 {
            return Ok(Vec::new());
        }
        Ok(model.predict(&Self::to_data(x, None)))
    }
}

impl ClassifierModel for GBDTClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<()> {
        check_fit_inputs(&self.name, x, y)?;
        require_both_classes(&self.name, y)?;
        if self.params.num_boost_round == 0 || self.params.max_depth == 0 {
            return Err(fit_error(
                &self.name,
                "num_boost_round and max_depth must be at least 1",
            ));
        }

        let mut config = Config::new();
        config.set_feature_size(x.ncols());
        config.set_shrinkage(self.params.learning_rate);
        config.set_max_depth(self.params.max_depth);
        config.set_iterations(self.params.num_boost_round as usize);
        config.set_debug(self.params.debug);
        config.set_training_optimization_level(self.params.training_optimization_level);
        config.set_loss("LogLikelyhood");

        let mut gbdt = GBDT::new(&config);
        let labels = to_signed_labels(y);
        let mut train_x = Self::to_data(x, Some(&labels));
        gbdt.fit(&mut train_x);

        self.n_features = x.ncols();
        self.model = Some(gbdt);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>> {
        Ok(threshold_probabilities(&self.predict_proba(x)?))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn params() -> GbdtParams {
        GbdtParams {
            learning_rate: 0.1,
            max_depth: 3,
            num_boost_round: 20,
            debug: false,
            training_optimization_level: 2,
        }
    }

    #[test]
    fn test_gbdt_classifier_separates_classes() {
        // label follows the sign of the second feature
        let x = Array2::from_shape_vec(
            (10, 2),
            vec![
                0.1, 1.0, 0.4, -1.0, 0.6, 1.0, 0.9, -1.0, 1.2, 1.0, 1.5, -1.0, 1.8, 1.0, 2.1,
                -1.0, 2.4, 1.0, 2.7, -1.0,
            ],
        )
        .unwrap();
        let y = Array1::from_vec(vec![1u8, 0, 1, 0, 1, 0, 1, 0, 1, 0]);

        let mut classifier = GBDTClassifier::new("gbdt", params());
        classifier.fit(&x, &y).unwrap();

        let probs = classifier.predict_proba(&x).unwrap();
        assert_eq!(probs.len(), 10);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
        let predicted = classifier.predict(&x).unwrap();
        let correct = predicted.iter().zip(y.iter()).filter(|(p, t)| p == t).count();
        assert!(correct >= 9, "only {} of 10 training rows recovered", correct);
    }

    #[test]
    fn single_class_training_is_an_error() {
        let x = Array2::from_shape_vec((3, 1), vec![0.0, 1.0, 2.0]).unwrap();
        let y = Array1::from_vec(vec![1u8, 1, 1]);
        let mut classifier = GBDTClassifier::new("gbdt", params());
        assert!(classifier.fit(&x, &y).is_err());
    }
}
