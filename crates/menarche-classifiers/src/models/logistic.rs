use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{
    check_fit_inputs, check_predict_inputs, fit_error, fitted, from_class_indices,
    require_both_classes, to_class_indices,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticParams {
    pub alpha: f64,
    pub max_iterations: u64,
    pub gradient_tolerance: f64,
}

/// L2-regularized binary logistic regression.
#[derive(Serialize, Deserialize)]
pub struct LogisticClassifier {
    name: String,
    params: LogisticParams,
    n_features: usize,
    model: Option<FittedLogisticRegression<f64, usize>>,
}

impl LogisticClassifier {
    pub fn new(name: impl Into<String>, params: LogisticParams) -> Self {
        LogisticClassifier {
            name: name.into(),
            params,
            n_features: 0,
            model: None,
        }
    }
}

impl ClassifierModel for LogisticClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<()> {
        check_fit_inputs(&self.name, x, y)?;
        require_both_classes(&self.name, y)?;

        let dataset = DatasetBase::new(x.to_owned(), to_class_indices(y));
        let model = LogisticRegression::default()
            .alpha(self.params.alpha)
            .max_iterations(self.params.max_iterations)
            .gradient_tolerance(self.params.gradient_tolerance)
            .fit(&dataset)
            .map_err(|e| fit_error(&self.name, e))?;

        self.n_features = x.ncols();
        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>> {
        let model = fitted(&self.name, &self.model)?;
        check_predict_inputs(&self.name, x, self.n_features)?;
        let predictions: Array1<usize> = model.predict(x);
        Ok(from_class_indices(&predictions))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn separates_one_dimensional_classes() {
        let x = array![[-3.0], [-2.0], [-1.5], [-1.0], [1.0], [1.5], [2.0], [3.0]];
        let y = array![0u8, 0, 0, 0, 1, 1, 1, 1];
        let mut model = LogisticClassifier::new(
            "logreg",
            LogisticParams {
                alpha: 1.0,
                max_iterations: 100,
                gradient_tolerance: 1e-4,
            },
        );
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&array![[-4.0], [4.0]]).unwrap(), vec![0, 1]);
    }
}
