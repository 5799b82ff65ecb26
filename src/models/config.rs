use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file names searched for, in priority order
pub const CONFIG_FILES: &[&str] = &[
    ".examarkrc.json",
    "examark.config.json",
    "examark.toml",
    // Legacy names
    ".examifyrc.json",
    "examify.config.json",
];

/// Parent directories walked before giving up
const MAX_SEARCH_DEPTH: usize = 10;

/// Errors that can occur while loading a config file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse TOML config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Examark configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamarkConfig {
    /// Default points per question
    #[serde(default, alias = "default_points")]
    pub default_points: Option<f64>,

    /// Default output directory for QTI packages
    #[serde(default, alias = "output_dir")]
    pub output_dir: Option<PathBuf>,

    /// Always validate output after conversion
    #[serde(default)]
    pub validate: Option<bool>,

    /// Quiz title override
    #[serde(default)]
    pub title: Option<String>,
}

impl ExamarkConfig {
    /// Find and load the nearest config file, starting at `start_dir`
    ///
    /// A missing file yields the default config. A broken file is logged and
    /// also yields the default config.
    pub fn load(start_dir: &Path) -> Self {
        let Some(path) = find_config_file(start_dir) else {
            return Self::default();
        };

        match Self::load_file(&path) {
            Ok(config) => {
                tracing::debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{}", e);
                Self::default()
            }
        }
    }

    /// Load and sanitize a specific config file
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: ExamarkConfig = if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?
        };

        Ok(config.sanitized())
    }

    /// Drop values that cannot be used
    pub fn sanitized(self) -> Self {
        Self {
            default_points: self.default_points.filter(|p| p.is_finite() && *p > 0.0),
            output_dir: self.output_dir.filter(|p| !p.as_os_str().is_empty()),
            validate: self.validate,
            title: self.title.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Overlay explicit values (CLI flags) on top of this config
    pub fn merge(&self, overrides: &ExamarkConfig) -> ExamarkConfig {
        ExamarkConfig {
            default_points: overrides.default_points.or(self.default_points),
            output_dir: overrides.output_dir.clone().or_else(|| self.output_dir.clone()),
            validate: overrides.validate.or(self.validate),
            title: overrides.title.clone().or_else(|| self.title.clone()),
        }
    }
}

/// Search for a config file from `start_dir` up towards the filesystem root
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = Some(start_dir);
    let mut depth = 0;

    while let Some(dir) = current {
        if depth > MAX_SEARCH_DEPTH {
            break;
        }
        for name in CONFIG_FILES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        current = dir.parent();
        depth += 1;
    }

    None
}
