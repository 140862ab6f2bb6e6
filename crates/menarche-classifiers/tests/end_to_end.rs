mod common;

use approx::assert_abs_diff_eq;
use menarche_classifiers::config::{ModelConfig, ModelType, PipelineConfig};
use menarche_classifiers::data_handling::SplitConfig;
use menarche_classifiers::metrics::ConfusionMatrix;
use menarche_classifiers::pipeline::run_study;
use menarche_classifiers::preprocessing::derive_label;

fn config() -> PipelineConfig {
    PipelineConfig {
        split: SplitConfig {
            test_fraction: 0.2,
            seed: 42,
            stratify: false,
        },
        ..PipelineConfig::default()
    }
}

#[test]
fn majority_class_accuracy_matches_hand_computation() {
    let table = common::survey_table();
    let models = vec![ModelConfig::new("baseline", ModelType::MajorityClass {})];
    let result = run_study(&table, &config(), &models, None).unwrap();

    let labels: Vec<u8> = common::AGES
        .iter()
        .map(|&a| derive_label(a as f64).unwrap())
        .collect();
    assert_eq!(labels, vec![1, 1, 1, 0, 0, 0, 1, 0, 1, 0]);

    // Seed 42 holds out rows 0 (age 10, early) and 3 (age 13, late).
    let partition = &result.prepared.partition;
    assert_eq!(partition.test, vec![0, 3]);
    assert_eq!(partition.train.len(), 8);

    // Training rows are 4 early vs 4 late; the tie resolves to class 0.
    let row = result.table.get("baseline").unwrap();
    assert_abs_diff_eq!(row.metrics.accuracy, 0.5);
    assert_eq!(
        row.confusion,
        ConfusionMatrix::from_labels(&[1, 0], &[0, 0]).unwrap()
    );
}

#[test]
fn same_seed_gives_same_partition_and_metrics() {
    let table = common::survey_table();
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
    let a = run_study(&table, &config(), &models, None).unwrap();
    let b = run_study(&table, &config(), &models, None).unwrap();

    assert_eq!(a.prepared.partition, b.prepared.partition);
    assert_ne!(a.table.run.run_id, b.table.run.run_id);
    for (ra, rb) in a.table.rows.iter().zip(&b.table.rows) {
        assert_eq!(ra.model, rb.model);
        assert_eq!(ra.metrics, rb.metrics);
    }
}

#[test]
fn metric_ranges_hold_for_every_model() {
    let table = common::survey_table();
    let models = ModelConfig::default_suite();
    let result = run_study(&table, &config(), &models, None).unwrap();
    assert_eq!(result.table.rows.len() + result.table.failures.len(), models.len());
    for row in &result.table.rows {
        let m = &row.metrics;
        for v in [m.accuracy, m.precision, m.recall, m.f1] {
            assert!((0.0..=1.0).contains(&v));
        }
        assert!((-1.0..=1.0).contains(&m.kappa));
        let cm = &row.confusion;
        let acc = (cm.true_positives() + cm.true_negatives()) as f64 / cm.total() as f64;
        assert_abs_diff_eq!(m.accuracy, acc);
    }
}

#[test]
fn duplicate_model_names_fail_before_fitting() {
    let table = common::survey_table();
    let models = vec![
        ModelConfig::new("m", ModelType::MajorityClass {}),
        ModelConfig::new("m", ModelType::default()),
    ];
    assert!(run_study(&table, &config(), &models, None).is_err());
}
