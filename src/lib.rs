// Emmental - session bootstrap for multi-task learning pipelines
//
// This is the library crate containing the session state, the configuration
// and logging bootstrap, and the scoring and scheduling building blocks a
// training loop composes on top.

pub mod config;
pub mod data;
pub mod logging;
pub mod meta;
pub mod metrics;
pub mod schedulers;
pub mod scorer;

// Re-export commonly used types for convenience
pub use config::{Config, MAX_CONFIG_SEARCH_DEPTH, deep_merge, find_config_file};
pub use data::{Batch, DataLoader};
pub use logging::{LogFormat, LoggingOptions};
pub use meta::{DEFAULT_CONFIG_NAME, InitOptions, Meta, init, seeded_rng};
pub use schedulers::{MixedScheduler, ScheduledBatch, Scheduler};
pub use scorer::{MetricFn, MetricResult, Scorer, ScorerError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
