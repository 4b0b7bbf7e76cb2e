//! Error types shared by every LEGOMIND crate.

use std::sync::PoisonError;
use thiserror::Error;

/// Result alias used across LEGOMIND
pub type LegoResult<T> = Result<T, LegoError>;

/// Errors raised by the LEGOMIND runtime and hardware layer
///
/// Sensor readings outside the usable range are not errors; they are skipped
/// by the nodes that consume them. A `Hardware` error is treated as fatal by
/// the controller.
#[derive(Debug, Error)]
pub enum LegoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Hardware error on {device}: {message}")]
    Hardware { device: String, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Worker thread '{0}' panicked")]
    WorkerPanicked(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LegoError {
    /// Shorthand for a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        LegoError::Config(msg.into())
    }

    /// Shorthand for a hardware failure on a named device
    pub fn hardware(device: impl Into<String>, message: impl Into<String>) -> Self {
        LegoError::Hardware {
            device: device.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for LegoError {
    fn from(err: serde_json::Error) -> Self {
        LegoError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for LegoError {
    fn from(err: serde_yaml::Error) -> Self {
        LegoError::Serialization(err.to_string())
    }
}

impl<T> From<PoisonError<T>> for LegoError {
    fn from(err: PoisonError<T>) -> Self {
        LegoError::Internal(format!("Lock poisoned: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardware_error_message() {
        let err = LegoError::hardware("motor B", "tacho not responding");
        assert_eq!(err.to_string(), "Hardware error on motor B: tacho not responding");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: LegoError = io.into();
        assert!(matches!(err, LegoError::Io(_)));
    }
}
