mod common;

use std::collections::BTreeMap;
use std::fs;

use menarche_classifiers::artifacts::{load_manifest, save_artifacts, SCALER_FILE};
use menarche_classifiers::config::{ModelConfig, ModelType, PipelineConfig};
use menarche_classifiers::error::MenarcheError;
use menarche_classifiers::inference::{InferenceContext, InferenceError};
use menarche_classifiers::models::ClassifierModel;
use menarche_classifiers::pipeline::{run_study, StudyResult};
use menarche_classifiers::report::RankMetric;

fn study() -> StudyResult {
    let models = vec![
        ModelConfig::new("baseline", ModelType::MajorityClass {}),
        ModelConfig::new(
            "gbdt",
            ModelType::GBDT {
                learning_rate: 0.1,
                max_depth: 3,
                num_boost_round: 10,
                debug: false,
                training_optimization_level: 2,
            },
        ),
    ];
    run_study(
        &common::survey_table(),
        &PipelineConfig::default(),
        &models,
        None,
    )
    .unwrap()
}

fn record() -> BTreeMap<String, String> {
    [
        ("Dietary_Pattern", "Western"),
        ("Socioeconomic_Status", "High"),
        ("Environmental_Factors", "Urban"),
        ("Region", "North"),
        ("Industrialization_Level", "High"),
        ("Nutrition_Access", "Good"),
        ("BMI", "23.0"),
        ("Urban_Upbringing", "yes"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[test]
fn saved_run_predicts_single_record() {
    let dir = tempfile::tempdir().unwrap();
    let result = study();
    let manifest = save_artifacts(dir.path(), &result, RankMetric::F1).unwrap();
    assert_eq!(manifest.models.len(), 2);
    assert!(dir.path().join("models/baseline.json").exists());

    let reloaded = load_manifest(dir.path()).unwrap();
    assert_eq!(reloaded.run, manifest.run);
    assert_eq!(reloaded.models, manifest.models);
    assert_eq!(reloaded.schema, manifest.schema);

    let context = InferenceContext::from_artifacts(dir.path(), Some("baseline")).unwrap();
    let prediction = context.predict(&record()).unwrap();
    assert!(prediction.class <= 1);
    assert_eq!(prediction.model, "baseline");
    assert_eq!(prediction.run_id, result.prepared.run.run_id);
    let expected = if prediction.class == 1 { "≤12 years" } else { ">12 years" };
    assert_eq!(prediction.label, expected);

    // default model is the best ranked one
    let best = InferenceContext::from_artifacts(dir.path(), None).unwrap();
    assert_eq!(Some(best.model().to_string()), manifest.best_model);
}

#[test]
fn reloaded_model_predicts_like_the_fitted_one() {
    let dir = tempfile::tempdir().unwrap();
    let result = study();
    save_artifacts(dir.path(), &result, RankMetric::F1).unwrap();
    let context = InferenceContext::from_artifacts(dir.path(), Some("gbdt")).unwrap();

    let table = common::survey_table();
    let fitted = result
        .models
        .iter()
        .find(|m| m.config.name == "gbdt")
        .and_then(|m| m.classifier.as_ref())
        .unwrap();
    let expected = fitted.predict(&result.prepared.data.test.x).unwrap();
    for (k, &row) in result.prepared.partition.test.iter().enumerate() {
        let prediction = context.predict(&table.record(row)).unwrap();
        assert_eq!(prediction.class, expected[k]);
    }
}

#[test]
fn out_of_vocabulary_category_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    save_artifacts(dir.path(), &study(), RankMetric::F1).unwrap();
    let context = InferenceContext::from_artifacts(dir.path(), Some("gbdt")).unwrap();

    let mut record = record();
    record.insert("Region".to_string(), "Atlantis".to_string());
    match context.predict(&record) {
        Err(InferenceError::Rejected { reason }) => assert!(reason.contains("Atlantis")),
        other => panic!("expected rejection, got {:?}", other),
    }

    let mut record = self::record();
    record.remove("BMI");
    assert!(matches!(
        context.predict(&record),
        Err(InferenceError::Rejected { .. })
    ));

    let mut record = self::record();
    record.insert("BMI".to_string(), "heavy".to_string());
    assert!(matches!(
        context.predict(&record),
        Err(InferenceError::Rejected { .. })
    ));
}

#[test]
fn artifacts_from_different_runs_are_refused() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    save_artifacts(first.path(), &study(), RankMetric::F1).unwrap();
    save_artifacts(second.path(), &study(), RankMetric::F1).unwrap();

    fs::copy(
        second.path().join(SCALER_FILE),
        first.path().join(SCALER_FILE),
    )
    .unwrap();

    match InferenceContext::from_artifacts(first.path(), Some("baseline")) {
        Err(MenarcheError::ArtifactMismatch { .. }) => {}
        Err(other) => panic!("expected artifact mismatch, got {}", other),
        Ok(_) => panic!("mixed artifacts were accepted"),
    }
}

#[test]
fn truncated_scaler_deviations_are_refused() {
    let dir = tempfile::tempdir().unwrap();
    save_artifacts(dir.path(), &study(), RankMetric::F1).unwrap();

    let path = dir.path().join(SCALER_FILE);
    let mut envelope: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    envelope["payload"]["std"].as_array_mut().unwrap().pop();
    fs::write(&path, serde_json::to_string(&envelope).unwrap()).unwrap();

    match InferenceContext::from_artifacts(dir.path(), Some("baseline")) {
        Err(MenarcheError::ShapeMismatch { .. }) => {}
        Err(other) => panic!("expected shape mismatch, got {}", other),
        Ok(_) => panic!("scaler with missing deviations was accepted"),
    }
}

#[test]
fn unknown_model_name_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    save_artifacts(dir.path(), &study(), RankMetric::F1).unwrap();
    assert!(InferenceContext::from_artifacts(dir.path(), Some("forest")).is_err());
}
