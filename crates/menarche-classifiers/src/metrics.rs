//! Binary confusion matrix and classification metrics.
//!
//! The positive class is `1` (early onset). Ratios with a zero
//! denominator are reported as `0.0`.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MenarcheError, Result};
use crate::preprocessing::{EARLY_LABEL, LATE_LABEL};

/// Entry `[true][predicted]` counts samples with that (true, predicted) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    matrix: [[usize; 2]; 2],
}

/// Per-class precision, recall and F1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub class: u8,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

impl ConfusionMatrix {
    /// Build from true and predicted labels (both 0/1).
    pub fn from_labels(y_true: &[u8], y_pred: &[u8]) -> Result<Self> {
        if y_true.is_empty() {
            return Err(MenarcheError::EmptyDataset);
        }
        if y_true.len() != y_pred.len() {
            return Err(MenarcheError::ShapeMismatch {
                expected: format!("{} predictions", y_true.len()),
                got: format!("{} predictions", y_pred.len()),
            });
        }
        let mut matrix = [[0usize; 2]; 2];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            if t > 1 || p > 1 {
                return Err(MenarcheError::InvalidValue {
                    row: 0,
                    column: "label".to_string(),
                    value: format!("{}/{}", t, p),
                });
            }
            matrix[t as usize][p as usize] += 1;
        }
        Ok(ConfusionMatrix { matrix })
    }

    pub fn true_positives(&self) -> usize {
        self.matrix[1][1]
    }

    pub fn true_negatives(&self) -> usize {
        self.matrix[0][0]
    }

    pub fn false_positives(&self) -> usize {
        self.matrix[0][1]
    }

    pub fn false_negatives(&self) -> usize {
        self.matrix[1][0]
    }

    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives() + self.true_negatives(), self.total())
    }

    /// Cohen's kappa. Returns 0.0 when chance agreement is already perfect.
    pub fn cohen_kappa(&self) -> f64 {
        let n = self.total() as f64;
        let po = self.accuracy();
        let pe = (0..2)
            .map(|c| {
                let actual: usize = self.matrix[c].iter().sum();
                let predicted = self.matrix[0][c] + self.matrix[1][c];
                (actual as f64 / n) * (predicted as f64 / n)
            })
            .sum::<f64>();
        if (1.0 - pe).abs() < f64::EPSILON {
            0.0
        } else {
            (po - pe) / (1.0 - pe)
        }
    }

    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        [LATE_LABEL, EARLY_LABEL]
            .iter()
            .map(|&class| {
                let c = class as usize;
                let other = 1 - c;
                let tp = self.matrix[c][c];
                let support = tp + self.matrix[c][other];
                let precision = ratio(tp, tp + self.matrix[other][c]);
                let recall = ratio(tp, support);
                ClassMetrics {
                    class,
                    precision,
                    recall,
                    f1: f1(precision, recall),
                    support,
                }
            })
            .collect()
    }

    pub fn as_rows(&self) -> &[[usize; 2]; 2] {
        &self.matrix
    }

    /// Text report in the usual per-class layout.
    pub fn classification_report(&self) -> String {
        let mut out = format!(
            "{:>12} {:>10} {:>10} {:>10} {:>10}\n",
            "", "precision", "recall", "f1-score", "support"
        );
        for m in self.class_metrics() {
            out.push_str(&format!(
                "{:>12} {:>10.4} {:>10.4} {:>10.4} {:>10}\n",
                class_name(m.class),
                m.precision,
                m.recall,
                m.f1,
                m.support
            ));
        }
        out.push_str(&format!(
            "{:>12} {:>10} {:>10} {:>10.4} {:>10}\n",
            "accuracy",
            "",
            "",
            self.accuracy(),
            self.total()
        ));
        out
    }
}

/// Short class label used in reports.
pub fn class_name(class: u8) -> &'static str {
    if class == EARLY_LABEL {
        "early(<=12)"
    } else {
        "late(>12)"
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>8} {:>7} {:>7}", "", "pred_0", "pred_1")?;
        for (i, row) in self.matrix.iter().enumerate() {
            writeln!(f, "true_{:<3} {:>7} {:>7}", i, row[0], row[1])?;
        }
        Ok(())
    }
}

/// The five scores reported for every model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinaryMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub kappa: f64,
}

impl BinaryMetrics {
    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        let precision = ratio(
            cm.true_positives(),
            cm.true_positives() + cm.false_positives(),
        );
        let recall = ratio(
            cm.true_positives(),
            cm.true_positives() + cm.false_negatives(),
        );
        BinaryMetrics {
            accuracy: cm.accuracy(),
            precision,
            recall,
            f1: f1(precision, recall),
            kappa: cm.cohen_kappa(),
        }
    }

    pub fn from_labels(y_true: &[u8], y_pred: &[u8]) -> Result<(Self, ConfusionMatrix)> {
        let cm = ConfusionMatrix::from_labels(y_true, y_pred)?;
        Ok((Self::from_confusion(&cm), cm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn perfect_predictions() {
        let y = [0, 1, 1, 0, 1];
        let (m, cm) = BinaryMetrics::from_labels(&y, &y).unwrap();
        assert_abs_diff_eq!(m.accuracy, 1.0);
        assert_abs_diff_eq!(m.precision, 1.0);
        assert_abs_diff_eq!(m.recall, 1.0);
        assert_abs_diff_eq!(m.f1, 1.0);
        assert_abs_diff_eq!(m.kappa, 1.0);
        assert_eq!(cm.total(), 5);
    }

    #[test]
    fn known_confusion_matrix() {
        // TP=2 FN=1 FP=1 TN=2
        let y_true = [1, 1, 1, 0, 0, 0];
        let y_pred = [1, 1, 0, 1, 0, 0];
        let (m, cm) = BinaryMetrics::from_labels(&y_true, &y_pred).unwrap();
        assert_eq!(cm.as_rows(), &[[2, 1], [1, 2]]);
        assert_abs_diff_eq!(m.accuracy, 4.0 / 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.precision, 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.recall, 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.f1, 2.0 / 3.0, epsilon = 1e-12);
        // po = 2/3, pe = 0.5
        assert_abs_diff_eq!(m.kappa, 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            m.accuracy,
            (cm.true_positives() + cm.true_negatives()) as f64 / cm.total() as f64
        );
    }

    #[test]
    fn inverted_predictions_give_negative_kappa() {
        let y_true = [0, 1, 0, 1];
        let y_pred = [1, 0, 1, 0];
        let (m, _) = BinaryMetrics::from_labels(&y_true, &y_pred).unwrap();
        assert_abs_diff_eq!(m.kappa, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.accuracy, 0.0);
    }

    #[test]
    fn no_positive_predictions_scores_zero() {
        let y_true = [1, 0, 0];
        let y_pred = [0, 0, 0];
        let (m, _) = BinaryMetrics::from_labels(&y_true, &y_pred).unwrap();
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1, 0.0);
        assert_eq!(m.kappa, 0.0);
        assert!(m.accuracy > 0.6);
    }

    #[test]
    fn single_class_agreement_kappa_is_zero() {
        let (m, _) = BinaryMetrics::from_labels(&[0, 0], &[0, 0]).unwrap();
        assert_eq!(m.kappa, 0.0);
        assert_eq!(m.accuracy, 1.0);
    }

    #[test]
    fn rejects_empty_and_mismatched_input() {
        assert!(matches!(
            ConfusionMatrix::from_labels(&[], &[]).unwrap_err(),
            MenarcheError::EmptyDataset
        ));
        assert!(ConfusionMatrix::from_labels(&[0, 1], &[0]).is_err());
        assert!(ConfusionMatrix::from_labels(&[2], &[0]).is_err());
    }

    #[test]
    fn report_lists_both_classes() {
        let cm = ConfusionMatrix::from_labels(&[0, 1], &[0, 1]).unwrap();
        let report = cm.classification_report();
        assert!(report.contains("early(<=12)"));
        assert!(report.contains("late(>12)"));
        assert!(format!("{}", cm).contains("pred_1"));
    }
}
