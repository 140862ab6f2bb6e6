//! Input checks and label conversions shared by the model wrappers.
use ndarray::{Array1, Array2};

use crate::error::{MenarcheError, Result};
use crate::preprocessing::EARLY_LABEL;

pub(crate) fn fit_error(model: &str, reason: impl ToString) -> MenarcheError {
    MenarcheError::ModelFit {
        model: model.to_string(),
        reason: reason.to_string(),
    }
}

pub(crate) fn predict_error(model: &str, reason: impl ToString) -> MenarcheError {
    MenarcheError::ModelPredict {
        model: model.to_string(),
        reason: reason.to_string(),
    }
}

/// Reject empty or misaligned training data before handing it to a learner.
pub(crate) fn check_fit_inputs(model: &str, x: &Array2<f64>, y: &Array1<u8>) -> Result<()> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(fit_error(model, "training matrix is empty"));
    }
    if x.nrows() != y.len() {
        return Err(fit_error(
            model,
            format!("{} rows but {} labels", x.nrows(), y.len()),
        ));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(fit_error(model, "training matrix contains non-finite values"));
    }
    Ok(())
}

/// Learners that estimate a decision boundary need both classes present.
pub(crate) fn require_both_classes(model: &str, y: &Array1<u8>) -> Result<()> {
    let early = y.iter().filter(|&&v| v == EARLY_LABEL).count();
    if early == 0 || early == y.len() {
        return Err(fit_error(model, "training labels contain a single class"));
    }
    Ok(())
}

pub(crate) fn check_predict_inputs(model: &str, x: &Array2<f64>, n_features: usize) -> Result<()> {
    if x.ncols() != n_features {
        return Err(predict_error(
            model,
            format!("expected {} features, got {}", n_features, x.ncols()),
        ));
    }
    Ok(())
}

pub(crate) fn fitted<'a, T>(model: &str, inner: &'a Option<T>) -> Result<&'a T> {
    inner.as_ref().ok_or_else(|| MenarcheError::ModelNotFitted {
        model: model.to_string(),
    })
}

/// 1 -> +1.0, 0 -> -1.0 (log-likelihood boosting convention).
pub(crate) fn to_signed_labels(y: &Array1<u8>) -> Vec<f32> {
    y.iter()
        .map(|&v| if v == EARLY_LABEL { 1.0 } else { -1.0 })
        .collect()
}

#[cfg(feature = "linfa")]
pub(crate) fn to_class_indices(y: &Array1<u8>) -> Array1<usize> {
    y.mapv(|v| v as usize)
}

#[cfg(feature = "linfa")]
pub(crate) fn from_class_indices(y: &Array1<usize>) -> Vec<u8> {
    y.iter().map(|&v| if v == 1 { 1 } else { 0 }).collect()
}

/// Probability of the positive class -> label, at 0.5.
pub(crate) fn threshold_probabilities(probs: &[f32]) -> Vec<u8> {
    probs
        .iter()
        .map(|&p| if p >= 0.5 { EARLY_LABEL } else { 0 })
        .collect()
}
