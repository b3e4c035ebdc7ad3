use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while configuring or driving the mascot.
///
/// Mood transitions themselves are total; everything here comes from
/// parsing user input or loading settings.
#[derive(Error, Debug, Clone)]
pub enum MascotError {
    /// A mood name that is not part of the closed mood set
    #[error("Unknown mood '{0}'. Expected one of: idle, curious, happy, excited, sleepy, talking")]
    UnknownMood(Arc<String>),

    /// An overflow policy name that could not be parsed
    #[error("Unknown overflow policy '{0}'. Expected drop-oldest or drop-newest")]
    UnknownOverflowPolicy(Arc<String>),

    /// Error when reading or writing a settings file
    #[error("Configuration error for {path}: {message}")]
    ConfigurationError { path: PathBuf, message: Arc<String> },

    /// Settings loaded fine but carry a value we cannot run with
    #[error("Invalid setting: {field} - {message}")]
    InvalidSetting { field: Arc<String>, message: Arc<String> },

    /// Error when the platform config directory cannot be resolved
    #[error("Could not determine config path")]
    ConfigPathUnavailable,

    /// IO error
    #[error("IO error: {0}")]
    IoError(Arc<std::io::Error>),
}

/// Type alias for Result with `MascotError`
pub type Result<T> = std::result::Result<T, MascotError>;

impl From<std::io::Error> for MascotError {
    fn from(error: std::io::Error) -> Self {
        MascotError::IoError(Arc::new(error))
    }
}

impl MascotError {
    pub(crate) fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        MascotError::ConfigurationError {
            path: path.into(),
            message: Arc::new(message.into()),
        }
    }

    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        MascotError::InvalidSetting {
            field: Arc::new(field.to_string()),
            message: Arc::new(message.into()),
        }
    }
}
