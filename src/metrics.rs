// Evaluation metrics module
//
// Builtin metrics over parallel gold/prediction label columns. The builtins
// are binary with the positive label fixed at 1; probabilities are not
// consumed here, only by custom scorer metrics.

use tracing::debug;

/// The label treated as positive by precision, recall, and f1.
pub const POS_LABEL: i64 = 1;

/// Check that the two label columns line up; degenerate inputs score zero.
fn aligned(metric: &str, gold: &[i64], preds: &[i64]) -> bool {
    if gold.len() != preds.len() {
        debug!(
            "{}: gold and preds have different lengths ({} vs {})",
            metric,
            gold.len(),
            preds.len()
        );
        return false;
    }
    !gold.is_empty()
}

/// Fraction of predictions matching the gold labels.
///
/// Empty or length-mismatched columns score 0.0.
pub fn accuracy(gold: &[i64], preds: &[i64]) -> f64 {
    if !aligned("accuracy", gold, preds) {
        return 0.0;
    }

    let correct = gold.iter().zip(preds).filter(|(g, p)| g == p).count();
    correct as f64 / gold.len() as f64
}

/// Fraction of positive predictions that are correct.
///
/// Scores 0.0 when nothing was predicted positive.
pub fn precision(gold: &[i64], preds: &[i64]) -> f64 {
    if !aligned("precision", gold, preds) {
        return 0.0;
    }

    let predicted_positive = preds.iter().filter(|&&p| p == POS_LABEL).count();
    if predicted_positive == 0 {
        return 0.0;
    }

    let true_positive = gold
        .iter()
        .zip(preds)
        .filter(|&(&g, &p)| g == POS_LABEL && p == POS_LABEL)
        .count();
    true_positive as f64 / predicted_positive as f64
}

/// Fraction of gold positives that were predicted positive.
///
/// Scores 0.0 when the gold column has no positives.
pub fn recall(gold: &[i64], preds: &[i64]) -> f64 {
    if !aligned("recall", gold, preds) {
        return 0.0;
    }

    let gold_positive = gold.iter().filter(|&&g| g == POS_LABEL).count();
    if gold_positive == 0 {
        return 0.0;
    }

    let true_positive = gold
        .iter()
        .zip(preds)
        .filter(|&(&g, &p)| g == POS_LABEL && p == POS_LABEL)
        .count();
    true_positive as f64 / gold_positive as f64
}

/// Harmonic mean of precision and recall.
pub fn f1(gold: &[i64], preds: &[i64]) -> f64 {
    let precision = precision(gold, preds);
    let recall = recall(gold, preds);

    if precision + recall == 0.0 {
        return 0.0;
    }

    2.0 * precision * recall / (precision + recall)
}
