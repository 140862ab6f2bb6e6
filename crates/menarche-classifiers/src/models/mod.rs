pub mod baseline;
pub mod gbdt;
#[cfg(feature = "linfa")]
pub mod decision_tree;
#[cfg(feature = "linfa")]
pub mod logistic;
#[cfg(feature = "linfa")]
pub mod naive_bayes;
#[cfg(feature = "linfa")]
pub mod svm;
pub(crate) mod utils;

pub mod classifier_trait;
pub mod factory;

pub use classifier_trait::ClassifierModel;
pub use factory::{build_model, Classifier};
