//! menarche-classifiers: age-of-menarche category classification study.
//!
//! Loads a delimited survey table, encodes the categorical columns, derives
//! the early/late onset label, standardizes features on a seeded training
//! partition and compares a closed set of classifiers (majority baseline,
//! GBDT and, with the `linfa` feature, logistic regression, decision tree,
//! Gaussian naive Bayes and SVM) on the held-out partition.
//!
//! Fitted encoders, scaler and models are persisted per run so single
//! records can be scored later through [`inference::InferenceContext`].
pub mod artifacts;
pub mod config;
pub mod data_handling;
pub mod error;
pub mod evaluation;
pub mod inference;
pub mod io;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod report;
pub mod run_info;
pub mod schema;

pub use error::{MenarcheError, Result};
