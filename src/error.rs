use std::{error::Error, io, path::PathBuf};

use thiserror::Error;
use validator::ValidationErrors;

/// Failure reported by a hardware collaborator while initialising.
#[derive(Debug, Error)]
#[error("{peripheral} unavailable: {message}")]
pub struct PeripheralError {
    /// Short name of the peripheral (e.g. `"display"`).
    pub peripheral: &'static str,
    /// Human readable reason.
    pub message: String,
    /// Underlying driver error, when there is one.
    #[source]
    pub source: Option<Box<dyn Error + Send + Sync>>,
}

impl PeripheralError {
    /// Build an error without an underlying source.
    pub fn new(peripheral: &'static str, message: impl Into<String>) -> Self {
        Self {
            peripheral,
            message: message.into(),
            source: None,
        }
    }

    /// Build an error wrapping a driver failure.
    pub fn with_source(
        peripheral: &'static str,
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            peripheral,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Errors that prevent the controller from starting.
#[derive(Debug, Error)]
pub enum SetupError {
    /// A peripheral the game cannot run without failed to initialise.
    #[error("mandatory peripheral failed to initialise")]
    MandatoryPeripheral(#[source] PeripheralError),
}

/// Errors raised while reading the game configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config `{path}`")]
    Read {
        /// Path that was read.
        path: PathBuf,
        #[source]
        /// I/O failure.
        source: io::Error,
    },
    /// The file is not valid JSON for the expected schema.
    #[error("failed to parse config `{path}`")]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        #[source]
        /// Decoder failure.
        source: serde_json::Error,
    },
    /// A value is outside its allowed range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<ValidationErrors> for ConfigError {
    fn from(err: ValidationErrors) -> Self {
        ConfigError::Invalid(format!("validation failed: {}", err))
    }
}
