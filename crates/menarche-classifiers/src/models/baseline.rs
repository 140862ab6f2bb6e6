use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{check_fit_inputs, check_predict_inputs, fitted};
use crate::preprocessing::{EARLY_LABEL, LATE_LABEL};

/// Predicts the most frequent training label for every row.
///
/// Ties go to the late class (0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MajorityClassifier {
    name: String,
    majority: Option<u8>,
    n_features: usize,
}

impl MajorityClassifier {
    pub fn new(name: impl Into<String>) -> Self {
        MajorityClassifier {
            name: name.into(),
            majority: None,
            n_features: 0,
        }
    }

    pub fn majority(&self) -> Option<u8> {
        self.majority
    }
}

impl ClassifierModel for MajorityClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<()> {
        check_fit_inputs(&self.name, x, y)?;
        let early = y.iter().filter(|&&v| v == EARLY_LABEL).count();
        let late = y.len() - early;
        self.majority = Some(if early > late { EARLY_LABEL } else { LATE_LABEL });
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>> {
        let majority = *fitted(&self.name, &self.majority)?;
        check_predict_inputs(&self.name, x, self.n_features)?;
        Ok(vec![majority; x.nrows()])
    }

    fn name(&self) -> &str {
        &self.name
    }
}
