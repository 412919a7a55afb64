// Session state module
//
// A Meta session owns everything the bootstrap configures: the active log
// directory, the configuration tree, and the shared RNG. It is constructed
// once at process start and passed by reference to whatever needs it.

use crate::config::{self, Config};
use crate::logging::{self, LoggingOptions};
use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_yaml_ng::Value;
use tracing_appender::non_blocking::WorkerGuard;

/// File name the config updater searches parent directories for.
pub const DEFAULT_CONFIG_NAME: &str = "emmental-config.yaml";

/// Per-session metadata: log location, configuration tree, and shared RNG.
///
/// One `Meta` is constructed per session, usually through [`init`], and
/// passed by reference to whatever needs configuration or randomness.
pub struct Meta {
    /// Run directory of the active logging sinks, set once per session
    log_path: Option<Utf8PathBuf>,

    /// The active configuration tree, unset until [`init_config`](Self::init_config)
    config: Option<Config>,

    /// The session RNG, seeded by [`init`] from `meta_config.seed`
    rng: Option<StdRng>,

    /// Keeps the non-blocking log writer thread alive for the session
    _log_guard: Option<WorkerGuard>,
}

impl Meta {
    /// Create a session with nothing configured yet.
    pub fn new() -> Self {
        Self {
            log_path: None,
            config: None,
            rng: None,
            _log_guard: None,
        }
    }

    /// Run directory of the active logging sinks, if logging was initialized.
    pub fn log_path(&self) -> Option<&Utf8Path> {
        self.log_path.as_deref()
    }

    /// The active configuration, if one was loaded.
    pub fn config(&self) -> Option<&Config> {
        self.config.as_ref()
    }

    /// Mutable access to the active configuration, if one was loaded.
    pub fn config_mut(&mut self) -> Option<&mut Config> {
        self.config.as_mut()
    }

    /// The session RNG, if the session was bootstrapped through [`init`].
    pub fn rng(&mut self) -> Option<&mut StdRng> {
        self.rng.as_mut()
    }

    /// Initialize logging into a timestamped directory under `options.dir`.
    ///
    /// The first call creates `<dir>/<YYYY_MM_DD>/<HH_MM_SS>` and installs a
    /// file sink there next to a console sink. Later calls on the same
    /// session leave the first configuration in place and only log where the
    /// session already writes.
    ///
    /// # Arguments
    /// * `options` - Base directory, file name, format, and level for the sinks
    pub fn init_logging(&mut self, options: &LoggingOptions) -> Result<()> {
        if let Some(existing) = &self.log_path {
            tracing::info!(
                "Logging was already initialized to use {}. To reconfigure, start a new session.",
                existing
            );
            return Ok(());
        }

        let (run_dir, guard) = logging::setup(options)?;
        tracing::info!("Setting logging directory to: {}", run_dir);

        self.log_path = Some(run_dir);
        self._log_guard = Some(guard);
        Ok(())
    }

    /// Load the bundled default configuration, replacing any prior tree.
    pub fn init_config(&mut self) -> Result<()> {
        let config = Config::bundled_default()?;
        tracing::info!("Loading bundled default config.");

        self.config = Some(config);
        Ok(())
    }

    /// Merge overrides into the active configuration.
    ///
    /// Two independent merge paths run in order: a non-empty `overrides`
    /// document is deep-merged first; then, if `search_dir` is given, the
    /// upward search looks for `file_name` and deep-merges the first file it
    /// finds. At most one file is merged per call.
    ///
    /// # Arguments
    /// * `overrides` - Override document merged ahead of any found file
    /// * `search_dir` - Starting directory for the upward file search
    /// * `file_name` - File name the search probes for, e.g. `"emmental-config.yaml"`
    ///
    /// # Errors
    /// Fails if no configuration is loaded yet, or if a found file does not
    /// parse as a YAML mapping. Finding no file at all is not an error.
    pub fn update_config(
        &mut self,
        overrides: &Config,
        search_dir: Option<&Utf8Path>,
        file_name: &str,
    ) -> Result<()> {
        let config = self
            .config
            .as_mut()
            .context("Config is not initialized; call init_config first")?;

        if !overrides.is_empty() {
            config.merge_from(overrides);
            tracing::info!("Updating config from user provided config.");
        }

        if let Some(search_dir) = search_dir {
            match config::find_config_file(search_dir, file_name) {
                Some(path) => {
                    let file_config = Config::from_file(&path)?;
                    config.merge_from(&file_config);
                    tracing::info!("Updating config from {}.", path);
                }
                None => {
                    tracing::info!("Unable to find config file. Using defaults.");
                }
            }
        }

        Ok(())
    }
}

impl Default for Meta {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the session RNG from an optional seed.
///
/// `Some(seed)` gives a deterministic generator; `None` seeds from OS
/// entropy.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Read `meta_config.seed` from a configuration.
///
/// A missing key is an error; an explicit null means "seed from entropy";
/// anything else must be an integer. Negative seeds map through their
/// two's-complement bits.
fn seed_from_config(config: &Config) -> Result<Option<u64>> {
    match config.require("meta_config.seed")? {
        Value::Null => Ok(None),
        Value::Number(number) => {
            if let Some(seed) = number.as_u64() {
                Ok(Some(seed))
            } else if let Some(seed) = number.as_i64() {
                Ok(Some(seed as u64))
            } else {
                bail!("meta_config.seed must be an integer or null, got {}", number)
            }
        }
        other => bail!("meta_config.seed must be an integer or null, got {:?}", other),
    }
}

/// Options for [`init`].
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Sink options forwarded to [`Meta::init_logging`]
    pub logging: LoggingOptions,

    /// Override document merged during bootstrap when `config_dir` is set
    pub overrides: Config,

    /// Starting directory for the upward config search; `None` skips the
    /// update step entirely
    pub config_dir: Option<Utf8PathBuf>,

    /// File name the search probes for
    pub config_name: String,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            logging: LoggingOptions::default(),
            overrides: Config::new(),
            config_dir: None,
            config_name: DEFAULT_CONFIG_NAME.to_string(),
        }
    }
}

/// Bootstrap a session: logging, configuration, and the seeded RNG.
///
/// Runs [`Meta::init_logging`] and [`Meta::init_config`], then, when
/// `config_dir` is set, [`Meta::update_config`] with the given overrides and
/// file name. Finally reads `meta_config.seed` and seeds the session RNG;
/// a configuration whose seed key went missing fails the bootstrap.
///
/// # Example
/// ```ignore
/// use rand::RngCore;
///
/// let mut meta = emmental::init(InitOptions::default())?;
/// let draw = meta.rng().unwrap().next_u64();
/// ```
pub fn init(options: InitOptions) -> Result<Meta> {
    let mut meta = Meta::new();

    meta.init_logging(&options.logging)?;
    meta.init_config()?;
    if let Some(config_dir) = options.config_dir.as_deref() {
        meta.update_config(&options.overrides, Some(config_dir), &options.config_name)?;
    }

    let config = meta.config.as_ref().context("Config is not initialized")?;
    let seed = seed_from_config(config)?;
    meta.rng = Some(seeded_rng(seed));

    Ok(meta)
}
