use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found at {path}")]
    NotFound { path: PathBuf },

    #[error("Could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Threshold routing.thresholds.{name} = {value} must lie in [0, 1]")]
    ThresholdOutOfRange { name: &'static str, value: f32 },

    #[error("Thresholds in routing.thresholds must be non-decreasing (simple <= moderate <= complex <= enterprise)")]
    ThresholdsUnordered,

    #[error("Weight routing.weights.{table}.{word} is not a finite number")]
    NonFiniteWeight { table: &'static str, word: String },

    #[error("{field} must be greater than zero")]
    ZeroSetting { field: &'static str },

    #[error("Failed to get home directory")]
    NoHomeDirectory,

    #[error("Failed to render config as TOML: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub(crate) fn io(path: &std::path::Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True for problems in the file's content rather than in reaching it.
    pub fn is_invalid_content(&self) -> bool {
        matches!(
            self,
            ConfigError::Parse { .. }
                | ConfigError::ThresholdOutOfRange { .. }
                | ConfigError::ThresholdsUnordered
                | ConfigError::NonFiniteWeight { .. }
                | ConfigError::ZeroSetting { .. }
        )
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
