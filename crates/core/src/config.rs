use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Missing required setting: {0}")]
    Missing(&'static str),
    #[error("Invalid setting {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Connection settings for the upsert target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbCredentials {
    /// sqlx connection URL, e.g. `sqlite://retail.db`.
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    1
}

impl DbCredentials {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
        }
    }
}

/// Everything one pipeline run needs. Built once by the caller and passed in;
/// nothing downstream reads process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    pub source_path: PathBuf,
    pub output_dir: PathBuf,
    /// No credentials means the load step is skipped.
    pub db_credentials: Option<DbCredentials>,
    /// Optional TOML replacing parts of the built-in vocabulary.
    pub vocabulary_path: Option<PathBuf>,
}

impl EtlConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_content)?)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_path.as_os_str().is_empty() {
            return Err(ConfigError::Missing("source_path"));
        }
        if let Some(db) = &self.db_credentials {
            if db.url.trim().is_empty() {
                return Err(ConfigError::Missing("db_credentials.url"));
            }
            if db.max_connections == 0 {
                return Err(ConfigError::Invalid {
                    key: "db_credentials.max_connections",
                    message: "must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Where cleaned output files go; the working directory when unset.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        if self.output_dir.as_os_str().is_empty() {
            PathBuf::from(file_name)
        } else {
            self.output_dir.join(file_name)
        }
    }
}
