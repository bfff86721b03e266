//! Runtime configuration – reads/writes a `marionette.toml` file.
//!
//! ```toml
//! scheduler = "worker_pool"   # or "immediate"
//! worker_threads = 4
//! wait_for_jobs = true
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading or writing a [`RuntimeConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to access config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Where job-mode retargeting work runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerKind {
    /// Inline on the frame thread.
    #[default]
    Immediate,
    /// On a dedicated Tokio blocking pool.
    WorkerPool,
}

impl fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerKind::Immediate => write!(f, "immediate"),
            SchedulerKind::WorkerPool => write!(f, "worker_pool"),
        }
    }
}

impl FromStr for SchedulerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "immediate" => Ok(SchedulerKind::Immediate),
            "worker_pool" => Ok(SchedulerKind::WorkerPool),
            other => Err(format!("unknown scheduler '{other}'")),
        }
    }
}

/// Settings for a [`FrameDriver`][crate::frame_loop::FrameDriver].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub scheduler: SchedulerKind,

    /// Blocking-pool size for [`SchedulerKind::WorkerPool`].  Ignored by the
    /// immediate scheduler.
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,

    /// Block at the end of every frame until its job chain has finished.
    #[serde(default = "default_wait_for_jobs")]
    pub wait_for_jobs: bool,
}

fn default_worker_threads() -> usize {
    4
}
fn default_wait_for_jobs() -> bool {
    true
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerKind::default(),
            worker_threads: default_worker_threads(),
            wait_for_jobs: default_wait_for_jobs(),
        }
    }
}

impl RuntimeConfig {
    /// Load from `path` and apply environment overrides.  Returns `None` if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cfg: RuntimeConfig = toml::from_str(&raw)?;
        cfg.apply_env_overrides();
        Ok(Some(cfg))
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = toml::to_string_pretty(self)?;
        fs::write(path, raw).map_err(io_err)
    }

    /// Apply `MARIONETTE_*` environment variable overrides.
    ///
    /// | Variable | Config field |
    /// |---|---|
    /// | `MARIONETTE_SCHEDULER` | `scheduler` |
    /// | `MARIONETTE_WORKER_THREADS` | `worker_threads` |
    ///
    /// Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("MARIONETTE_SCHEDULER")
            && let Ok(kind) = v.parse::<SchedulerKind>()
        {
            self.scheduler = kind;
        }
        if let Some(v) = lookup("MARIONETTE_WORKER_THREADS")
            && let Ok(n) = v.parse::<usize>()
            && n > 0
        {
            self.worker_threads = n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("nested").join("marionette.toml");

        RuntimeConfig::default().save_to(&path).expect("save");
        let loaded = RuntimeConfig::load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.worker_threads, 4);
        assert!(loaded.wait_for_jobs);
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let result = RuntimeConfig::load_from(&dir.path().join("marionette.toml")).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: RuntimeConfig = toml::from_str(r#"scheduler = "worker_pool""#).unwrap();
        assert_eq!(cfg.scheduler, SchedulerKind::WorkerPool);
        assert_eq!(cfg.worker_threads, 4);
        assert!(cfg.wait_for_jobs);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("marionette.toml");
        fs::write(&path, "scheduler = 12").unwrap();
        assert!(matches!(RuntimeConfig::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn env_overrides_scheduler_and_threads() {
        let mut cfg = RuntimeConfig::default();
        cfg.apply_overrides(env(&[
            ("MARIONETTE_SCHEDULER", "worker_pool"),
            ("MARIONETTE_WORKER_THREADS", "8"),
        ]));
        assert_eq!(cfg.scheduler, SchedulerKind::WorkerPool);
        assert_eq!(cfg.worker_threads, 8);
    }

    #[test]
    fn env_overrides_ignore_invalid_values() {
        let mut cfg = RuntimeConfig::default();
        cfg.apply_overrides(env(&[
            ("MARIONETTE_SCHEDULER", "gpu"),
            ("MARIONETTE_WORKER_THREADS", "0"),
        ]));
        assert_eq!(cfg, RuntimeConfig::default());

        cfg.apply_overrides(env(&[("MARIONETTE_WORKER_THREADS", "many")]));
        assert_eq!(cfg.worker_threads, 4);
    }

    #[test]
    fn scheduler_kind_display_matches_serde_names() {
        for kind in [SchedulerKind::Immediate, SchedulerKind::WorkerPool] {
            assert_eq!(kind.to_string().parse::<SchedulerKind>(), Ok(kind));
        }
    }
}
