//! Integration tests for epoch scheduling
//!
//! These tests verify:
//! - The mixed scheduler interleaves one batch per loader at every step
//! - Config-driven construction picks up the fillup flag
//! - A scheduled epoch feeds the scorer end to end

use emmental::{
    Batch, Config, DataLoader, MetricResult, MixedScheduler, Scheduler, Scorer,
};
use indexmap::IndexMap;

/// Builds a loader whose batches carry the given label rows, with uids of the
/// form `{data_name}-{batch}-{row}`.
fn loader(data_name: &str, split: &str, labels_per_batch: &[Vec<i64>]) -> DataLoader {
    let batches = labels_per_batch
        .iter()
        .enumerate()
        .map(|(index, labels)| {
            let uids = (0..labels.len())
                .map(|row| format!("{data_name}-{index}-{row}"))
                .collect();
            let features = IndexMap::from([(
                "embedding".to_string(),
                labels.iter().map(|&label| label as f64).collect(),
            )]);
            Batch {
                uids,
                features,
                labels: IndexMap::from([("label".to_string(), labels.clone())]),
            }
        })
        .collect();

    DataLoader {
        data_name: data_name.to_string(),
        split: split.to_string(),
        task_to_label: IndexMap::from([(format!("{data_name}_task"), "label".to_string())]),
        batches,
    }
}

#[test]
fn test_bundled_config_schedules_without_fillup() {
    let config = Config::bundled_default().unwrap();
    let scheduler = MixedScheduler::from_config(&config).unwrap();
    assert!(!scheduler.fillup);

    let loaders = vec![
        loader("camembert", "train", &[vec![1, 0], vec![1], vec![0]]),
        loader("gruyere", "train", &[vec![0], vec![1]]),
    ];

    // Without fillup the shortest loader bounds the epoch
    assert_eq!(scheduler.num_batches(&loaders), 2);

    let steps: Vec<_> = scheduler.batches(&loaders).collect();
    assert_eq!(steps.len(), 2);
    for (step_index, step) in steps.iter().enumerate() {
        let names: Vec<&str> = step.iter().map(|batch| batch.data_name).collect();
        assert_eq!(names, ["camembert", "gruyere"]);
        assert_eq!(step[0].split, "train");
        assert_eq!(step[0].task_to_label["camembert_task"], "label");
        assert_eq!(step[0].uids[0], format!("camembert-{step_index}-0"));
    }
}

#[test]
fn test_fillup_override_wraps_exhausted_loaders() {
    let mut config = Config::bundled_default().unwrap();
    let overrides =
        Config::from_yaml_str("learner_config:\n  task_scheduler_config:\n    fillup: true\n")
            .unwrap();
    config.merge_from(&overrides);

    let scheduler = MixedScheduler::from_config(&config).unwrap();
    assert!(scheduler.fillup);

    let loaders = vec![
        loader("camembert", "train", &[vec![1], vec![0], vec![1]]),
        loader("gruyere", "train", &[vec![0, 1]]),
    ];

    assert_eq!(scheduler.num_batches(&loaders), 3);

    let steps: Vec<_> = scheduler.batches(&loaders).collect();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[2][0].uids[0], "camembert-2-0");
    // The lone gruyere batch comes back once its loader is exhausted
    assert_eq!(steps[2][1].uids[0], "gruyere-0-0");
}

#[test]
fn test_scoring_a_scheduled_epoch() {
    let scheduler = MixedScheduler::new(false);
    let loaders = vec![
        loader("camembert", "train", &[vec![1, 1, 0, 1], vec![1, 0]]),
        loader("gruyere", "train", &[vec![0, 0], vec![1, 1]]),
    ];

    let mut gold = Vec::new();
    let mut probs = Vec::new();
    for step in scheduler.batches(&loaders) {
        for scheduled in step {
            for &label in &scheduled.labels["label"] {
                gold.push(label);
                probs.push(if label == 1 {
                    vec![0.1, 0.9]
                } else {
                    vec![0.9, 0.1]
                });
            }
        }
    }
    assert_eq!(gold.len(), 10);

    let preds = gold.clone();
    let scorer = Scorer::new(&["accuracy", "f1"]).unwrap();
    let metric_dict = scorer.score(&gold, &preds, &probs);

    assert_eq!(metric_dict["accuracy"], 1.0);
    assert_eq!(metric_dict["f1"], 1.0);
}

#[test]
fn test_custom_metric_sees_probabilities() {
    let scorer = Scorer::new(&[])
        .unwrap()
        .with_metric("mean_positive_prob", |_gold, _preds, probs| {
            let total: f64 = probs.iter().map(|row| row[1]).sum();
            MetricResult::Value(total / probs.len() as f64)
        });

    let scheduler = MixedScheduler::new(false);
    let loaders = vec![loader("camembert", "valid", &[vec![1, 0]])];

    let mut gold = Vec::new();
    for step in scheduler.batches(&loaders) {
        for scheduled in step {
            gold.extend_from_slice(&scheduled.labels["label"]);
        }
    }

    let preds = gold.clone();
    let probs = vec![vec![0.2, 0.8], vec![0.6, 0.4]];
    let metric_dict = scorer.score(&gold, &preds, &probs);

    assert!((metric_dict["mean_positive_prob"] - 0.6).abs() < f64::EPSILON);
}
