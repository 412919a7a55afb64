use super::{ScheduledBatch, Scheduler};
use crate::config::Config;
use crate::data::DataLoader;
use anyhow::Result;
use serde::Deserialize;

/// Mixed scheduler: every step carries one batch from every loader.
///
/// Without fillup an epoch is as long as the shortest loader. With fillup it
/// is as long as the longest one, and shorter loaders restart from their
/// first batch when they run out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MixedScheduler {
    /// Whether shorter loaders restart to match the longest loader
    pub fillup: bool,
}

/// The `learner_config.task_scheduler_config` section, as far as this
/// scheduler reads it.
#[derive(Debug, Deserialize)]
struct TaskSchedulerSection {
    #[serde(default)]
    fillup: bool,
}

impl MixedScheduler {
    /// Create a scheduler with the given fillup behavior.
    pub fn new(fillup: bool) -> Self {
        Self { fillup }
    }

    /// Build the scheduler from `learner_config.task_scheduler_config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let section: TaskSchedulerSection =
            config.section("learner_config.task_scheduler_config")?;
        Ok(Self::new(section.fillup))
    }
}

impl Scheduler for MixedScheduler {
    fn num_batches(&self, dataloaders: &[DataLoader]) -> usize {
        let batch_counts = dataloaders.iter().map(DataLoader::num_batches);
        let num_batches = if self.fillup {
            batch_counts.max()
        } else {
            batch_counts.min()
        };
        num_batches.unwrap_or(0)
    }

    fn batches<'a>(
        &self,
        dataloaders: &'a [DataLoader],
    ) -> Box<dyn Iterator<Item = Vec<ScheduledBatch<'a>>> + 'a> {
        let num_batches = self.num_batches(dataloaders);

        Box::new((0..num_batches).map(move |step| {
            dataloaders
                .iter()
                .filter(|dataloader| !dataloader.is_empty())
                .map(|dataloader| {
                    // Exhausted loaders wrap around to their first batch
                    let batch = &dataloader.batches[step % dataloader.num_batches()];
                    ScheduledBatch {
                        uids: &batch.uids,
                        features: &batch.features,
                        labels: &batch.labels,
                        task_to_label: &dataloader.task_to_label,
                        data_name: &dataloader.data_name,
                        split: &dataloader.split,
                    }
                })
                .collect()
        }))
    }
}
