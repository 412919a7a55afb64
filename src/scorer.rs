use crate::metrics;
use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;

/// Result of one metric function: a single value or several named values.
pub enum MetricResult {
    /// One value, stored under the metric's registered name
    Value(f64),
    /// Several named values, flattened into the score map as-is
    Values(IndexMap<String, f64>),
}

/// A metric function over gold labels, predicted labels, and probability rows.
pub type MetricFn = Box<dyn Fn(&[i64], &[i64], &[Vec<f64>]) -> MetricResult + Send + Sync>;

/// Errors that can occur while building a scorer
#[derive(Error, Debug)]
pub enum ScorerError {
    #[error("Unrecognized metric: {0}")]
    UnrecognizedMetric(String),
}

fn accuracy_metric(gold: &[i64], preds: &[i64], _probs: &[Vec<f64>]) -> MetricResult {
    MetricResult::Value(metrics::accuracy(gold, preds))
}

fn precision_metric(gold: &[i64], preds: &[i64], _probs: &[Vec<f64>]) -> MetricResult {
    MetricResult::Value(metrics::precision(gold, preds))
}

fn recall_metric(gold: &[i64], preds: &[i64], _probs: &[Vec<f64>]) -> MetricResult {
    MetricResult::Value(metrics::recall(gold, preds))
}

fn f1_metric(gold: &[i64], preds: &[i64], _probs: &[Vec<f64>]) -> MetricResult {
    MetricResult::Value(metrics::f1(gold, preds))
}

/// Applies a set of named metrics to one task's outputs.
///
/// Builtin metric names are resolved eagerly at construction so a typo shows
/// up when the scorer is built, not at the end of an evaluation pass. Custom
/// metrics registered afterwards may shadow builtins by name.
pub struct Scorer {
    metrics: IndexMap<String, MetricFn>,
}

impl Scorer {
    /// Create a scorer from builtin metric names.
    ///
    /// # Arguments
    /// * `metric_names` - Builtin names: "accuracy", "precision", "recall", "f1"
    ///
    /// # Returns
    /// The scorer, or [`ScorerError::UnrecognizedMetric`] naming the first
    /// unknown metric.
    pub fn new(metric_names: &[&str]) -> Result<Self, ScorerError> {
        let mut registered: IndexMap<String, MetricFn> = IndexMap::new();

        for &name in metric_names {
            let metric: MetricFn = match name {
                "accuracy" => Box::new(accuracy_metric),
                "precision" => Box::new(precision_metric),
                "recall" => Box::new(recall_metric),
                "f1" => Box::new(f1_metric),
                unknown => return Err(ScorerError::UnrecognizedMetric(unknown.to_string())),
            };
            registered.insert(name.to_string(), metric);
        }

        Ok(Self {
            metrics: registered,
        })
    }

    /// Register a custom metric, replacing any existing metric with the name.
    pub fn with_metric<F>(mut self, name: &str, metric: F) -> Self
    where
        F: Fn(&[i64], &[i64], &[Vec<f64>]) -> MetricResult + Send + Sync + 'static,
    {
        self.metrics.insert(name.to_string(), Box::new(metric));
        self
    }

    /// Names of the registered metrics, in registration order.
    pub fn metric_names(&self) -> Vec<&str> {
        self.metrics.keys().map(String::as_str).collect()
    }

    /// Apply every registered metric to the given columns.
    ///
    /// Single-value results are stored under the metric's name; multi-value
    /// results contribute their own names.
    ///
    /// # Arguments
    /// * `gold` - Gold labels
    /// * `preds` - Predicted labels, parallel to `gold`
    /// * `probs` - Per-example probability rows, consumed by custom metrics
    pub fn score(&self, gold: &[i64], preds: &[i64], probs: &[Vec<f64>]) -> IndexMap<String, f64> {
        let mut metric_dict = IndexMap::new();

        for (metric_name, metric) in &self.metrics {
            match metric(gold, preds, probs) {
                MetricResult::Value(value) => {
                    metric_dict.insert(metric_name.clone(), value);
                }
                MetricResult::Values(values) => {
                    metric_dict.extend(values);
                }
            }
        }

        metric_dict
    }
}

impl fmt::Debug for Scorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scorer")
            .field("metrics", &self.metric_names())
            .finish()
    }
}
