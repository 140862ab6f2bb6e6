use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_svm::{Svm, SvmParams};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{
    check_fit_inputs, check_predict_inputs, fit_error, fitted, require_both_classes,
};
use crate::preprocessing::EARLY_LABEL;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvmSettings {
    pub eps: f64,
    pub c: (f64, f64),
    pub kernel: String,
    pub gaussian_kernel_eps: f64,
    pub polynomial_kernel_constant: f64,
    pub polynomial_kernel_degree: f64,
}

/// Support vector classifier with a linear, gaussian or polynomial kernel.
#[derive(Serialize, Deserialize)]
pub struct SVMClassifier {
    name: String,
    params: SvmSettings,
    n_features: usize,
    model: Option<Svm<f64, bool>>,
}

impl SVMClassifier {
    pub fn new(name: impl Into<String>, params: SvmSettings) -> Self {
        SVMClassifier {
            name: name.into(),
            params,
            n_features: 0,
            model: None,
        }
    }

    fn build_params(&self) -> Result<SvmParams<f64, bool>> {
        let (c_pos, c_neg) = self.params.c;
        let model = Svm::<f64, bool>::params()
            .eps(self.params.eps)
            .pos_neg_weights(c_pos, c_neg);

        // Chain the kernel configuration based on the kernel type
        match self.params.kernel.as_str() {
            "linear" => Ok(model.linear_kernel()),
            "gauss" => Ok(model.gaussian_kernel(self.params.gaussian_kernel_eps)),
            "poly" => Ok(model.polynomial_kernel(
                self.params.polynomial_kernel_constant,
                self.params.polynomial_kernel_degree,
            )),
            other => Err(fit_error(
                &self.name,
                format!(
                    "unsupported kernel type: {}. Valid options are: linear, gauss, poly",
                    other
                ),
            )),
        }
    }
}

impl ClassifierModel for SVMClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<()> {
        check_fit_inputs(&self.name, x, y)?;
        require_both_classes(&self.name, y)?;

        let targets = y.mapv(|v| v == EARLY_LABEL);
        let dataset = DatasetBase::new(x.to_owned(), targets);
        let params = self.build_params()?;
        let model = params
            .fit(&dataset)
            .map_err(|e| fit_error(&self.name, e))?;

        self.n_features = x.ncols();
        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>> {
        let model = fitted(&self.name, &self.model)?;
        check_predict_inputs(&self.name, x, self.n_features)?;
        let predictions: Array1<bool> = model.predict(x);
        Ok(predictions.iter().map(|&p| p as u8).collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn settings(kernel: &str) -> SvmSettings {
        SvmSettings {
            eps: 1e-3,
            c: (1.0, 1.0),
            kernel: kernel.to_string(),
            gaussian_kernel_eps: 1.0,
            polynomial_kernel_constant: 1.0,
            polynomial_kernel_degree: 2.0,
        }
    }

    #[test]
    fn test_svm_classifier_linear() {
        let x = array![
            [-2.0, -1.5],
            [-1.5, -2.0],
            [-1.8, -1.2],
            [-2.2, -1.9],
            [2.0, 1.5],
            [1.5, 2.0],
            [1.8, 1.2],
            [2.2, 1.9]
        ];
        let y = array![0u8, 0, 0, 0, 1, 1, 1, 1];

        let mut classifier = SVMClassifier::new("svm", settings("linear"));
        classifier.fit(&x, &y).unwrap();
        let predicted = classifier.predict(&array![[-2.0, -2.0], [2.0, 2.0]]).unwrap();
        assert_eq!(predicted, vec![0, 1]);
    }

    #[test]
    fn unknown_kernel_is_a_fit_error() {
        let x = array![[0.0], [1.0]];
        let y = array![0u8, 1];
        let mut classifier = SVMClassifier::new("svm", settings("sigmoid"));
        assert!(classifier.fit(&x, &y).is_err());
    }
}
