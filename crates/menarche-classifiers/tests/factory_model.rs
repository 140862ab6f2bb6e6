use menarche_classifiers::config::{ModelConfig, ModelType};
use menarche_classifiers::models::{build_model, Classifier, ClassifierModel};
use ndarray::{Array1, Array2};

fn toy_data() -> (Array2<f64>, Array1<u8>) {
    let x = Array2::from_shape_vec(
        (8, 2),
        vec![
            1.0, 0.0, // early
            0.0, 1.0, // late
            1.0, 0.1, // early
            0.0, 0.9, // late
            1.1, 0.0, // early
            0.0, 1.2, // late
            0.9, 0.2, // early
            0.1, 1.1, // late
        ],
    )
    .expect("failed to create feature matrix");
    let y = Array1::from_vec(vec![1, 0, 1, 0, 1, 0, 1, 0]);
    (x, y)
}

#[test]
fn test_factory_builds_and_predicts() {
    let (x, y) = toy_data();
    let config = ModelConfig::new(
        "gbdt",
        ModelType::GBDT {
            learning_rate: 0.1,
            max_depth: 3,
            num_boost_round: 5,
            debug: false,
            training_optimization_level: 2,
        },
    );

    let mut model = build_model(&config).unwrap();
    model.fit(&x, &y).unwrap();
    let predictions = model.predict(&x).unwrap();
    assert_eq!(predictions.len(), x.nrows());
    assert!(predictions.iter().all(|&p| p <= 1));
}

#[test]
fn model_config_reads_from_json() {
    let json = r#"{
        "name": "shallow_boost",
        "GBDT": {
            "learning_rate": 0.05,
            "max_depth": 2,
            "num_boost_round": 30,
            "debug": false,
            "training_optimization_level": 2
        }
    }"#;
    let config: ModelConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.name, "shallow_boost");
    assert_eq!(config.model_type.kind(), "gbdt");

    let baseline: ModelConfig =
        serde_json::from_str(r#"{"name": "baseline", "MajorityClass": {}}"#).unwrap();
    assert_eq!(baseline.model_type, ModelType::MajorityClass {});
}

#[test]
fn fitted_classifier_survives_serialization() {
    let (x, y) = toy_data();
    for config in ModelConfig::default_suite() {
        let mut model = build_model(&config).unwrap();
        model.fit(&x, &y).unwrap();
        let before = model.predict(&x).unwrap();

        let json = serde_json::to_string(&model).unwrap();
        let restored: Classifier = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.name(), config.name);
        assert_eq!(restored.predict(&x).unwrap(), before, "{}", config.name);
    }
}

#[test]
fn unfitted_classifier_refuses_to_predict() {
    let (x, _) = toy_data();
    let model = build_model(&ModelConfig::default()).unwrap();
    assert!(model.predict(&x).is_err());
}
