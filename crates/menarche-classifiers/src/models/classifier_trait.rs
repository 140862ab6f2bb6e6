use ndarray::{Array1, Array2};

use crate::error::Result;

/// Contract shared by every predictor variant of the comparison.
///
/// Labels use the crate convention: 1 for early onset, 0 for late onset.
/// Implementations return errors instead of panicking so a failing model
/// can be isolated from the rest of an evaluation run.
pub trait ClassifierModel {
    /// Fit on a standardized feature matrix and its labels.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<()>;

    /// Predict a discrete label per row.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>>;

    /// Human readable name of the model instance.
    fn name(&self) -> &str {
        "classifier"
    }
}
