use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_bayes::GaussianNb;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{
    check_fit_inputs, check_predict_inputs, fit_error, fitted, from_class_indices,
    require_both_classes, to_class_indices,
};

#[derive(Serialize, Deserialize)]
pub struct GaussianNbClassifier {
    name: String,
    var_smoothing: f64,
    n_features: usize,
    model: Option<GaussianNb<f64, usize>>,
}

impl GaussianNbClassifier {
    pub fn new(name: impl Into<String>, var_smoothing: f64) -> Self {
        GaussianNbClassifier {
            name: name.into(),
            var_smoothing,
            n_features: 0,
            model: None,
        }
    }
}

impl ClassifierModel for GaussianNbClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<()> {
        check_fit_inputs(&self.name, x, y)?;
        require_both_classes(&self.name, y)?;

        let dataset = DatasetBase::new(x.to_owned(), to_class_indices(y));
        let model = GaussianNb::<f64, usize>::params()
            .var_smoothing(self.var_smoothing)
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
    fn separates_gaussian_blobs() {
        let x = array![
            [-2.0, -2.1],
            [-1.9, -2.2],
            [-2.2, -1.8],
            [-2.1, -2.0],
            [2.0, 2.1],
            [1.9, 2.2],
            [2.2, 1.8],
            [2.1, 2.0]
        ];
        let y = array![0u8, 0, 0, 0, 1, 1, 1, 1];
        let mut model = GaussianNbClassifier::new("nb", 1e-9);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&array![[-2.0, -2.0], [2.0, 2.0]]).unwrap(), vec![0, 1]);
    }
}
