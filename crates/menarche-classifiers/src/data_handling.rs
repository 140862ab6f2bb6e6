//! Labelled feature matrices and the seeded train/test partition.
//!
//! `Experiment` keeps features, labels and feature names row-aligned.
//! `train_test_split` produces a reproducible `Partition` from an explicit
//! seed; `Experiment::split` applies it without breaking row correspondence.
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{MenarcheError, Result};
use crate::preprocessing::{Scaler, EARLY_LABEL, LATE_LABEL};

#[derive(Debug, Clone)]
pub struct Experiment {
    pub x: Array2<f64>,
    pub y: Array1<u8>,
    pub feature_names: Vec<String>,
}

impl Experiment {
    pub fn new(x: Array2<f64>, y: Array1<u8>, feature_names: Vec<String>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(MenarcheError::ShapeMismatch {
                expected: format!("{} labels", x.nrows()),
                got: format!("{} labels", y.len()),
            });
        }
        if x.ncols() != feature_names.len() {
            return Err(MenarcheError::ShapeMismatch {
                expected: format!("{} feature names", x.ncols()),
                got: format!("{} feature names", feature_names.len()),
            });
        }
        Ok(Experiment {
            x,
            y,
            feature_names,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// (late, early) label counts.
    pub fn class_counts(&self) -> (usize, usize) {
        let early = self.y.iter().filter(|&&v| v == EARLY_LABEL).count();
        (self.y.len() - early, early)
    }

    pub fn log_input_data_summary(&self) {
        let (late, early) = self.class_counts();
        println!("----- Input Data Summary -----");
        println!(
            "Info: {} samples: {} early onset (<=12 years), {} late onset (>12 years)",
            self.n_samples(),
            early,
            late
        );
        println!("Info: {} feature columns", self.n_features());
        println!("-------------------------------");
    }

    /// Keep the rows listed in `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Experiment {
        Experiment {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
            feature_names: self.feature_names.clone(),
        }
    }

    /// Filter rows with a boolean mask of the same length as the labels.
    pub fn filter(&self, mask: &[bool]) -> Experiment {
        let selected: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| if m { Some(i) } else { None })
            .collect();
        self.select(&selected)
    }

    /// Apply a partition and return `(train, test)`.
    pub fn split(&self, partition: &Partition) -> Result<(Experiment, Experiment)> {
        if partition.n_rows() != self.n_samples() {
            return Err(MenarcheError::ShapeMismatch {
                expected: format!("partition over {} rows", self.n_samples()),
                got: format!("partition over {} rows", partition.n_rows()),
            });
        }
        Ok((self.select(&partition.train), self.select(&partition.test)))
    }

    /// Replace the features with their standardized version.
    pub fn scaled(&self, scaler: &Scaler) -> Result<Experiment> {
        Ok(Experiment {
            x: scaler.transform(&self.x)?,
            y: self.y.clone(),
            feature_names: self.feature_names.clone(),
        })
    }
}

/// Training and test experiments after scaling.
#[derive(Debug, Clone)]
pub struct TrainTest {
    pub train: Experiment,
    pub test: Experiment,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SplitConfig {
    pub test_fraction: f64,
    pub seed: u64,
    pub stratify: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        SplitConfig {
            test_fraction: 0.2,
            seed: 42,
            stratify: false,
        }
    }
}

/// Disjoint, sorted training and test row indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl Partition {
    pub fn n_rows(&self) -> usize {
        self.train.len() + self.test.len()
    }
}

fn test_size(n_rows: usize, test_fraction: f64) -> Result<usize> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(MenarcheError::InvalidSplit {
            reason: format!("test fraction must be in (0, 1), got {}", test_fraction),
        });
    }
    let n_test = (n_rows as f64 * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n_rows {
        return Err(MenarcheError::InvalidSplit {
            reason: format!(
                "{} rows with test fraction {} leaves an empty partition",
                n_rows, test_fraction
            ),
        });
    }
    Ok(n_test)
}

/// Split row indices into training and test partitions.
///
/// `n_test = ceil(n * test_fraction)`. Rows are shuffled with a ChaCha8
/// generator seeded from `config.seed`; the first `n_test` shuffled rows
/// form the test partition. With `stratify` the shuffle and cut are done
/// per class so both partitions keep the class proportions.
pub fn train_test_split(labels: &[u8], config: &SplitConfig) -> Result<Partition> {
    let n_rows = labels.len();
    let n_test = test_size(n_rows, config.test_fraction)?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let mut test = if config.stratify {
        stratified_test_rows(labels, n_test, &mut rng)
    } else {
        let mut indices: Vec<usize> = (0..n_rows).collect();
        indices.shuffle(&mut rng);
        indices.truncate(n_test);
        indices
    };
    test.sort_unstable();

    let mut is_test = vec![false; n_rows];
    for &i in &test {
        is_test[i] = true;
    }
    let train = (0..n_rows).filter(|&i| !is_test[i]).collect();

    Ok(Partition { train, test })
}

fn stratified_test_rows(labels: &[u8], n_test: usize, rng: &mut ChaCha8Rng) -> Vec<usize> {
    let n_rows = labels.len() as f64;
    let mut per_class: Vec<Vec<usize>> = [LATE_LABEL, EARLY_LABEL]
        .iter()
        .map(|&class| {
            (0..labels.len())
                .filter(|&i| labels[i] == class)
                .collect::<Vec<_>>()
        })
        .collect();

    let mut quotas: Vec<usize> = per_class
        .iter()
        .map(|rows| ((rows.len() as f64 / n_rows) * n_test as f64).round() as usize)
        .collect();

    // rounding may miss the total by one; adjust the largest class
    let largest = if per_class[0].len() >= per_class[1].len() { 0 } else { 1 };
    let assigned: usize = quotas.iter().sum();
    if assigned > n_test {
        quotas[largest] -= assigned - n_test;
    } else if assigned < n_test {
        quotas[largest] += n_test - assigned;
    }

    let mut test = Vec::with_capacity(n_test);
    for (rows, quota) in per_class.iter_mut().zip(quotas) {
        rows.shuffle(rng);
        test.extend(rows.iter().take(quota.min(rows.len())));
    }
    test
}
