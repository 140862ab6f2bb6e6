use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{MenarcheError, Result};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{
    check_fit_inputs, check_predict_inputs, fit_error, fitted, from_class_indices,
    to_class_indices,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub split_quality: String,
}

/// Parse the impurity measure name used in model configs.
pub fn parse_split_quality(value: &str) -> Result<SplitQuality> {
    match value.to_ascii_lowercase().as_str() {
        "gini" => Ok(SplitQuality::Gini),
        "entropy" => Ok(SplitQuality::Entropy),
        other => Err(MenarcheError::InvalidConfig {
            reason: format!(
                "unsupported split quality: {}. Valid options are: gini, entropy",
                other
            ),
        }),
    }
}

/// CART decision tree.
#[derive(Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    name: String,
    params: TreeParams,
    n_features: usize,
    model: Option<DecisionTree<f64, usize>>,
}

impl DecisionTreeClassifier {
    pub fn new(name: impl Into<String>, params: TreeParams) -> Self {
        DecisionTreeClassifier {
            name: name.into(),
            params,
            n_features: 0,
            model: None,
        }
    }
}

impl ClassifierModel for DecisionTreeClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<()> {
        check_fit_inputs(&self.name, x, y)?;
        let split_quality = parse_split_quality(&self.params.split_quality)?;

        let dataset = DatasetBase::new(x.to_owned(), to_class_indices(y));
        let model = DecisionTree::<f64, usize>::params()
            .split_quality(split_quality)
            .max_depth(self.params.max_depth)
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
