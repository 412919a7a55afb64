// Task schedulers module
//
// A scheduler decides which batches feed each multi-task training step. It
// fixes the number of steps per epoch and the composition of every step;
// the training loop just drains the iterator.

use crate::data::DataLoader;
use indexmap::IndexMap;

mod mixed;

pub use mixed::MixedScheduler;

/// One loader's contribution to a training step.
///
/// Borrows straight from the loader: uids, feature and label columns, the
/// task-to-label routing, and the loader's identity.
#[derive(Debug, Clone)]
pub struct ScheduledBatch<'a> {
    /// Unique identifiers of the examples in the batch
    pub uids: &'a [String],

    /// Feature columns of the batch
    pub features: &'a IndexMap<String, Vec<f64>>,

    /// Label columns of the batch
    pub labels: &'a IndexMap<String, Vec<i64>>,

    /// Task-to-label routing of the originating loader
    pub task_to_label: &'a IndexMap<String, String>,

    /// Dataset name of the originating loader
    pub data_name: &'a str,

    /// Split of the originating loader
    pub split: &'a str,
}

/// Decides how batches from multiple loaders interleave within an epoch.
pub trait Scheduler {
    /// Number of steps one epoch runs over the given loaders.
    fn num_batches(&self, dataloaders: &[DataLoader]) -> usize;

    /// Lazily yield the composition of every step in one epoch.
    fn batches<'a>(
        &self,
        dataloaders: &'a [DataLoader],
    ) -> Box<dyn Iterator<Item = Vec<ScheduledBatch<'a>>> + 'a>;
}
