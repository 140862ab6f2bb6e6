use anyhow::{Context, Result};

use menarche_classifiers::inference::{InferenceContext, Prediction};

use crate::predict::input::PredictRequest;

/// Load the run's artifacts and classify the requested record.
///
/// A rejected record surfaces as an `InferenceError::Rejected` inside the
/// returned error.
pub fn run_prediction(request: &PredictRequest) -> Result<Prediction> {
    let context = InferenceContext::from_artifacts(&request.artifacts_dir, request.model.as_deref())
        .with_context(|| {
            format!(
                "Failed to load artifacts from {}",
                request.artifacts_dir.display()
            )
        })?;
    let prediction = context.predict(&request.record)?;
    log::info!(
        "Model '{}' of run {} predicts class {} ({})",
        prediction.model,
        prediction.run_id,
        prediction.class,
        prediction.label
    );
    Ok(prediction)
}
