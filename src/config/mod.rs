use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml_ng::{Mapping, Value};
use std::fs;

mod merge;

pub use merge::deep_merge;

/// Maximum number of directories the upward config search will visit,
/// counting the starting directory itself.
pub const MAX_CONFIG_SEARCH_DEPTH: usize = 25;

/// The default configuration document bundled with the crate.
const DEFAULT_CONFIG_YAML: &str = include_str!("emmental-default-config.yaml");

/// A nested YAML configuration document with string keys.
///
/// The tree is kept untyped (scalars, sequences, nested mappings) so that
/// user overrides can address any path without a schema. Typed views of
/// single sections are available through [`section`](Self::section).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    root: Mapping,
}

impl Config {
    /// Create an empty configuration document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the default configuration document bundled with the crate.
    pub fn bundled_default() -> Result<Self> {
        Self::from_yaml_str(DEFAULT_CONFIG_YAML).context("Failed to parse bundled default config")
    }

    /// Parse a configuration document from YAML text.
    ///
    /// An empty or explicitly null document yields an empty configuration;
    /// any other non-mapping top level is an error.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let value: Value = serde_yaml_ng::from_str(text)?;
        match value {
            Value::Null => Ok(Self::new()),
            Value::Mapping(root) => Ok(Self { root }),
            _ => bail!("Top-level config must be a mapping"),
        }
    }

    /// Load a configuration document from a YAML file.
    ///
    /// # Arguments
    /// * `path` - Path to the YAML file
    pub fn from_file<P: AsRef<Utf8Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let file_contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::from_yaml_str(&file_contents)
            .with_context(|| format!("Failed to parse config file: {}", path))
    }

    /// Whether the document has no top-level keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Borrow the underlying top-level mapping.
    pub fn as_mapping(&self) -> &Mapping {
        &self.root
    }

    /// Look up a value by dotted path, e.g. `"meta_config.seed"`.
    ///
    /// # Returns
    /// The value at the path, or `None` if any segment is missing or a
    /// non-mapping value is reached before the last segment.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.get(segment)?;
        }
        Some(current)
    }

    /// Look up a value by dotted path, failing if it is absent.
    pub fn require(&self, path: &str) -> Result<&Value> {
        self.get(path)
            .with_context(|| format!("Missing config key: {}", path))
    }

    /// Deserialize the subtree at a dotted path into a typed section.
    ///
    /// # Example
    /// ```ignore
    /// #[derive(Deserialize)]
    /// struct MetaSection { verbose: bool }
    /// let meta: MetaSection = config.section("meta_config")?;
    /// ```
    pub fn section<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.require(path)?;
        serde_yaml_ng::from_value(value.clone())
            .with_context(|| format!("Failed to deserialize config section: {}", path))
    }

    /// Deep-merge another configuration into this one.
    ///
    /// Entries from `overrides` win on conflict; see [`deep_merge`] for the
    /// merge rules.
    pub fn merge_from(&mut self, overrides: &Config) {
        for (key, override_value) in &overrides.root {
            match self.root.get_mut(key) {
                Some(base_value) => deep_merge(base_value, override_value),
                None => {
                    self.root.insert(key.clone(), override_value.clone());
                }
            }
        }
    }
}

/// Search for `file_name` in `start_dir` and its parent directories.
///
/// Visits at most [`MAX_CONFIG_SEARCH_DEPTH`] directories, stopping early at
/// the first hit or at the filesystem root. A missing start directory is not
/// an error; the probes simply find nothing.
///
/// # Returns
/// The full path of the first match, or `None` if the search exhausted its
/// bound or reached the root without finding the file.
pub fn find_config_file(start_dir: &Utf8Path, file_name: &str) -> Option<Utf8PathBuf> {
    let mut current_dir = start_dir;
    let mut tries = 0;

    loop {
        let candidate = current_dir.join(file_name);
        if candidate.exists() {
            return Some(candidate);
        }

        tries += 1;
        if tries >= MAX_CONFIG_SEARCH_DEPTH {
            return None;
        }

        current_dir = current_dir.parent()?;
    }
}
