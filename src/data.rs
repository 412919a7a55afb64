// Data containers module
//
// The minimal pre-batched stream shape the schedulers consume: named feature
// and label columns plus the bookkeeping needed to route batches to tasks.

use indexmap::IndexMap;

/// One batch of examples with named feature and label columns.
///
/// Columns are parallel to `uids`: `features["x"][i]` and `labels["task"][i]`
/// belong to the example identified by `uids[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    /// Unique identifiers of the examples in the batch
    pub uids: Vec<String>,

    /// Feature columns, keyed by feature name
    pub features: IndexMap<String, Vec<f64>>,

    /// Label columns, keyed by label name
    pub labels: IndexMap<String, Vec<i64>>,
}

/// A named, pre-batched stream of examples for one split.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataLoader {
    /// Name of the dataset this loader draws from
    pub data_name: String,

    /// The split this loader serves, e.g. "train"
    pub split: String,

    /// Maps task names to the label column each task trains on
    pub task_to_label: IndexMap<String, String>,

    /// The batches, in serving order
    pub batches: Vec<Batch>,
}

impl DataLoader {
    /// Number of batches the loader serves per pass.
    pub fn num_batches(&self) -> usize {
        self.batches.len()
    }

    /// Whether the loader has no batches.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}
