use anyhow::{ensure, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pii::EntityKind;

/// Default number of batch workers
pub const DEFAULT_WORKERS: usize = 4;

/// Default capacity for the job queue
pub const QUEUE_SIZE: usize = 100;

/// Prefix of environment variables overriding file settings
pub const ENV_PREFIX: &str = "EMAIL_TRIAGE";

/// Configuration for the triage pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Keyword model file; without one the classifier is unavailable
    pub model_path: Option<PathBuf>,

    /// Number of workers draining the batch queue
    pub workers: usize,

    /// Capacity of the batch job queue
    pub queue_size: usize,

    /// Directory for log files (logs go to stderr if None)
    pub log_dir: Option<String>,

    /// Entity kinds to mask, applied in standard registry order
    pub enabled_kinds: Vec<EntityKind>,

    /// Fail demasking when a recorded tag is missing instead of skipping it
    pub strict_demask: bool,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            workers: DEFAULT_WORKERS,
            queue_size: QUEUE_SIZE,
            log_dir: None,
            enabled_kinds: EntityKind::ALL.to_vec(),
            strict_demask: false,
        }
    }
}

impl TriageConfig {
    /// Loads settings from an optional file, then `EMAIL_TRIAGE_*` variables.
    ///
    /// The file format follows its extension (toml, json, yaml). Missing keys
    /// keep their defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let config: TriageConfig = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.workers > 0, "workers must be at least 1");
        ensure!(self.queue_size > 0, "queue_size must be at least 1");
        ensure!(!self.enabled_kinds.is_empty(), "enabled_kinds must name at least one kind");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = TriageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.enabled_kinds.len(), EntityKind::ALL.len());
        assert!(!config.strict_demask);
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "model_path = \"models/keyword_model.json\"\nqueue_size = 7\nenabled_kinds = [\"email\", \"cvv_no\"]\nstrict_demask = true"
        )
        .unwrap();

        let config = TriageConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.model_path, Some(PathBuf::from("models/keyword_model.json")));
        assert_eq!(config.queue_size, 7);
        assert_eq!(config.enabled_kinds, vec![EntityKind::Email, EntityKind::CvvNo]);
        assert!(config.strict_demask);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{\"queue_size\": 0}}").unwrap();
        assert!(TriageConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "workers = 2\nqueue_size = 5").unwrap();

        std::env::set_var("EMAIL_TRIAGE_WORKERS", "9");
        let loaded = TriageConfig::load(Some(file.path()));
        std::env::remove_var("EMAIL_TRIAGE_WORKERS");

        let config = loaded.unwrap();
        assert_eq!(config.workers, 9);
        assert_eq!(config.queue_size, 5);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(TriageConfig::load(Some(path.as_path())).is_err());
    }
}
