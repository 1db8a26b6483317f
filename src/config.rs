//! Execution configuration.
//!
//! YAML file with precedence ENV > file > defaults:
//!
//! ```yaml
//! version: 1
//! exec:
//!   mode: parallel      # serial | parallel
//!   threads: 4          # 0 = rayon default
//!   validate: true
//!   debug: false
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Only accepted `version`.
pub const CONFIG_VERSION: u32 = 1;

/// Environment variable overriding `exec.threads`.
pub const THREADS_ENV_VAR: &str = "TRUENO_SIMT_THREADS";

/// How a graph is traversed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecMode {
    /// Depth-first on the calling thread.
    #[default]
    Serial,
    /// Ready nodes spawned onto a rayon pool. Falls back to serial when the
    /// `parallel` feature is disabled.
    Parallel,
}

/// Graph execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecConfig {
    /// Traversal mode.
    #[serde(default)]
    pub mode: ExecMode,

    /// Worker threads for parallel mode; 0 uses the global rayon pool.
    #[serde(default)]
    pub threads: usize,

    /// Run the cycle and reachability check before every execution.
    #[serde(default = "default_validate")]
    pub validate: bool,

    /// Enable debug logging for the run.
    #[serde(default)]
    pub debug: bool,
}

fn default_validate() -> bool {
    true
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            mode: ExecMode::default(),
            threads: 0,
            validate: default_validate(),
            debug: false,
        }
    }
}

impl ExecConfig {
    /// Serial traversal without validation.
    #[must_use]
    pub fn serial() -> Self {
        Self {
            validate: false,
            ..Self::default()
        }
    }

    /// Parallel traversal on `threads` workers (0 = global pool).
    #[must_use]
    pub fn parallel(threads: usize) -> Self {
        Self {
            mode: ExecMode::Parallel,
            threads,
            ..Self::default()
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Configuration version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Execution settings.
    #[serde(default)]
    pub exec: ExecConfig,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            exec: ExecConfig::default(),
        }
    }
}

impl Config {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config dir>/trueno-simt/config.yaml`, if the platform has a config
    /// directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("trueno-simt").join("config.yaml"))
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if the file does not exist,
    /// [`Error::Io`] if it cannot be read, or a parse/validation error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ConfigNotFound(path.display().to_string()),
            _ => Error::Io(e),
        })?;

        crate::debug!("config", "loading {}", path.display());
        Self::parse(&content)
    }

    /// Parses and validates configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] with the 1-indexed line of the first
    /// syntax or type error, or [`Error::ConfigInvalid`].
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            Error::ConfigParse {
                line,
                message: e.to_string(),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, falling back to defaults on any error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|err| {
            crate::warn!("config", "{err}, using defaults");
            Self::default()
        })
    }

    /// Checks values that parse but are not meaningful.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigInvalid`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if self.version != CONFIG_VERSION {
            return Err(Error::ConfigInvalid {
                key: "version".to_string(),
                message: format!("unsupported version {}, expected {CONFIG_VERSION}", self.version),
            });
        }
        if self.exec.mode == ExecMode::Serial && self.exec.threads > 1 {
            return Err(Error::ConfigInvalid {
                key: "exec.threads".to_string(),
                message: "thread count requires mode: parallel".to_string(),
            });
        }
        Ok(())
    }

    /// Applies `TRUENO_SIMT_DEBUG` and `TRUENO_SIMT_THREADS` from the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigInvalid`] if an override does not parse.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from any key lookup. A thread override also switches
    /// the mode to parallel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigInvalid`] if an override does not parse.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup(crate::debug::ENV_VAR) {
            self.exec.debug = matches!(value.trim(), "1" | "true" | "on");
        }
        if let Some(value) = lookup(THREADS_ENV_VAR) {
            let threads = value.trim().parse::<usize>().map_err(|e| Error::ConfigInvalid {
                key: THREADS_ENV_VAR.to_string(),
                message: e.to_string(),
            })?;
            self.exec.threads = threads;
            self.exec.mode = ExecMode::Parallel;
        }
        Ok(())
    }
}
