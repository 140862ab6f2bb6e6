//! Ranked metrics table plus its text, TSV and HTML renderings.
pub mod plots;
pub mod report;

use std::cmp::Ordering;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MenarcheError, Result};
use crate::metrics::{BinaryMetrics, ConfusionMatrix};
use crate::run_info::RunInfo;

/// Metric used to rank models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMetric {
    Accuracy,
    Precision,
    Recall,
    #[default]
    F1,
    Kappa,
}

impl RankMetric {
    pub const ALL: [RankMetric; 5] = [
        RankMetric::Accuracy,
        RankMetric::Precision,
        RankMetric::Recall,
        RankMetric::F1,
        RankMetric::Kappa,
    ];

    pub fn value(&self, metrics: &BinaryMetrics) -> f64 {
        match self {
            RankMetric::Accuracy => metrics.accuracy,
            RankMetric::Precision => metrics.precision,
            RankMetric::Recall => metrics.recall,
            RankMetric::F1 => metrics.f1,
            RankMetric::Kappa => metrics.kappa,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RankMetric::Accuracy => "accuracy",
            RankMetric::Precision => "precision",
            RankMetric::Recall => "recall",
            RankMetric::F1 => "f1",
            RankMetric::Kappa => "kappa",
        }
    }
}

impl fmt::Display for RankMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankMetric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accuracy" => Ok(RankMetric::Accuracy),
            "precision" => Ok(RankMetric::Precision),
            "recall" => Ok(RankMetric::Recall),
            "f1" | "f1_score" => Ok(RankMetric::F1),
            "kappa" | "cohen_kappa" => Ok(RankMetric::Kappa),
            _ => Err(format!(
                "Unknown rank metric: {}. Valid options are: accuracy, precision, recall, f1, kappa",
                s
            )),
        }
    }
}

/// Test-partition scores of one successfully evaluated model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub model: String,
    pub kind: String,
    pub metrics: BinaryMetrics,
    pub confusion: ConfusionMatrix,
    pub fit_seconds: f64,
    pub predict_seconds: f64,
}

/// A model that could not be fitted or could not predict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFailure {
    pub model: String,
    pub reason: String,
}

/// Metrics of every model of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsTable {
    pub run: RunInfo,
    pub ranked_by: RankMetric,
    pub rows: Vec<MetricsRecord>,
    pub failures: Vec<ModelFailure>,
}

fn compare(a: &MetricsRecord, b: &MetricsRecord, metric: RankMetric, descending: bool) -> Ordering {
    let (va, vb) = (metric.value(&a.metrics), metric.value(&b.metrics));
    let by_value = if descending {
        vb.partial_cmp(&va)
    } else {
        va.partial_cmp(&vb)
    };
    by_value
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.model.cmp(&b.model))
}

impl MetricsTable {
    /// Build a table ranked by F1, descending.
    pub fn new(run: RunInfo, rows: Vec<MetricsRecord>, failures: Vec<ModelFailure>) -> Self {
        let mut table = MetricsTable {
            run,
            ranked_by: RankMetric::default(),
            rows,
            failures,
        };
        table.sort_by(RankMetric::default(), true);
        table
    }

    /// Reorder rows by `metric`. Ties are broken by model name.
    pub fn sort_by(&mut self, metric: RankMetric, descending: bool) {
        self.rows
            .sort_by(|a, b| compare(a, b, metric, descending));
        self.ranked_by = metric;
    }

    /// Highest scoring model for `metric`, ties broken by model name.
    pub fn best(&self, metric: RankMetric) -> Option<&MetricsRecord> {
        self.rows
            .iter()
            .min_by(|a, b| compare(a, b, metric, true))
    }

    pub fn get(&self, model: &str) -> Option<&MetricsRecord> {
        self.rows.iter().find(|r| r.model == model)
    }

    pub fn model_names(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.model.clone()).collect()
    }

    /// One row per evaluated model, tab separated, in table order.
    pub fn write_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| MenarcheError::io(path, e))?;
        let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_writer(file);
        writer.write_record([
            "rank",
            "model",
            "kind",
            "accuracy",
            "precision",
            "recall",
            "f1",
            "kappa",
            "tp",
            "fp",
            "tn",
            "fn",
            "fit_seconds",
            "predict_seconds",
        ])?;
        for (rank, row) in self.rows.iter().enumerate() {
            let m = &row.metrics;
            let cm = &row.confusion;
            writer.write_record(&[
                (rank + 1).to_string(),
                row.model.clone(),
                row.kind.clone(),
                format!("{:.6}", m.accuracy),
                format!("{:.6}", m.precision),
                format!("{:.6}", m.recall),
                format!("{:.6}", m.f1),
                format!("{:.6}", m.kappa),
                cm.true_positives().to_string(),
                cm.false_positives().to_string(),
                cm.true_negatives().to_string(),
                cm.false_negatives().to_string(),
                format!("{:.4}", row.fit_seconds),
                format!("{:.4}", row.predict_seconds),
            ])?;
        }
        writer.flush().map_err(|e| MenarcheError::io(path, e))?;
        Ok(())
    }
}

impl fmt::Display for MetricsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Run {} (seed {}, {} train / {} test), ranked by {}",
            self.run.run_id, self.run.seed, self.run.n_train, self.run.n_test, self.ranked_by
        )?;
        writeln!(
            f,
            "{:<4} {:<24} {:>9} {:>9} {:>9} {:>9} {:>9}",
            "rank", "model", "accuracy", "precision", "recall", "f1", "kappa"
        )?;
        for (rank, row) in self.rows.iter().enumerate() {
            let m = &row.metrics;
            writeln!(
                f,
                "{:<4} {:<24} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9.4}",
                rank + 1,
                row.model,
                m.accuracy,
                m.precision,
                m.recall,
                m.f1,
                m.kappa
            )?;
        }
        for failure in &self.failures {
            writeln!(f, "{:<4} {:<24} failed: {}", "-", failure.model, failure.reason)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_handling::{Partition, SplitConfig};

    fn record(model: &str, y_pred: &[u8]) -> MetricsRecord {
        let y_true = [1, 1, 0, 0];
        let (metrics, confusion) = BinaryMetrics::from_labels(&y_true, y_pred).unwrap();
        MetricsRecord {
            model: model.to_string(),
            kind: "test".to_string(),
            metrics,
            confusion,
            fit_seconds: 0.0,
            predict_seconds: 0.0,
        }
    }

    fn table() -> MetricsTable {
        let partition = Partition {
            train: vec![0, 1, 2, 3],
            test: vec![4, 5, 6, 7],
        };
        let run = RunInfo::new(&SplitConfig::default(), &partition, None);
        MetricsTable::new(
            run,
            vec![
                record("all_late", &[0, 0, 0, 0]),
                record("perfect", &[1, 1, 0, 0]),
                record("half", &[1, 0, 0, 1]),
            ],
            vec![ModelFailure {
                model: "broken".to_string(),
                reason: "boom".to_string(),
            }],
        )
    }

    #[test]
    fn ranks_by_f1_descending_by_default() {
        let table = table();
        assert_eq!(table.model_names(), vec!["perfect", "half", "all_late"]);
        assert_eq!(table.best(RankMetric::F1).unwrap().model, "perfect");
    }

    #[test]
    fn ties_are_broken_by_name() {
        let mut table = table();
        // all_late and half both have accuracy 0.5
        table.sort_by(RankMetric::Accuracy, true);
        assert_eq!(table.model_names(), vec!["perfect", "all_late", "half"]);
        table.sort_by(RankMetric::Kappa, false);
        assert_eq!(table.rows[2].model, "perfect");
    }

    #[test]
    fn display_lists_models_and_failures() {
        let text = table().to_string();
        assert!(text.contains("perfect"));
        assert!(text.contains("broken"));
        assert!(text.contains("failed: boom"));
    }

    #[test]
    fn writes_tsv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.tsv");
        table().write_tsv(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("rank\tmodel"));
        assert!(lines[1].starts_with("1\tperfect"));
    }

    #[test]
    fn rank_metric_parses() {
        assert_eq!("F1".parse::<RankMetric>().unwrap(), RankMetric::F1);
        assert_eq!("cohen_kappa".parse::<RankMetric>().unwrap(), RankMetric::Kappa);
        assert!("auc".parse::<RankMetric>().is_err());
    }
}
