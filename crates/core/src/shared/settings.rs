use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_AVATAR_PADDING, DEFAULT_DISTANCE_THRESHOLD, DEFAULT_MERGE_THRESHOLD,
    DEFAULT_MIN_CONFIDENCE, DEFAULT_TOLERANCE,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("workers must be at least 1")]
    NoWorkers,
}

/// Which identity resolver a run uses. Chosen once, up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Incremental,
    Batch,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Incremental => write!(f, "incremental"),
            Strategy::Batch => write!(f, "batch"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "incremental" => Ok(Strategy::Incremental),
            "batch" => Ok(Strategy::Batch),
            other => Err(format!(
                "strategy must be 'incremental' or 'batch', got '{other}'"
            )),
        }
    }
}

/// Tunables for one grouping run.
///
/// Missing keys in a settings file fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingSettings {
    pub strategy: Strategy,
    pub tolerance: f64,
    pub distance_threshold: f64,
    pub merge_threshold: f64,
    pub min_confidence: f32,
    pub avatar_padding: u32,
    pub workers: usize,
}

impl Default for GroupingSettings {
    fn default() -> Self {
        Self {
            strategy: Strategy::Batch,
            tolerance: DEFAULT_TOLERANCE,
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            merge_threshold: DEFAULT_MERGE_THRESHOLD,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            avatar_padding: DEFAULT_AVATAR_PADDING,
            workers: default_workers(),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl GroupingSettings {
    /// Platform config location, e.g. `~/.config/FaceSort/settings.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("FaceSort").join("settings.json"))
    }

    /// Loads from `path` when given, otherwise from [`Self::default_path`].
    ///
    /// An explicit path must exist; a missing file at the default location
    /// yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load_from(p),
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::load_from(&p),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("tolerance", self.tolerance, 0.0, 2.0)?;
        check_range("distance_threshold", self.distance_threshold, 0.0, 2.0)?;
        check_range("merge_threshold", self.merge_threshold, 0.0, 2.0)?;
        check_range("min_confidence", self.min_confidence as f64, 0.0, 1.0)?;
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}
