//! Error types.
//!
//! Devices fail in exactly one way: [`IoError`]. Whether a failure is logged or
//! handed back to the caller is decided by the [`DeviceManager`](crate::manager::DeviceManager)
//! policy for the phase it happened in, never by the device.

use std::path::PathBuf;

/// I/O failure raised by a device operation (open, update, close, rumble).
///
/// `origin` names where the failure came from (usually the device name, or
/// `DeviceManager` for failures detected by the manager itself).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{origin}: {message}")]
pub struct IoError {
    origin: String,
    message: String,
}

impl IoError {
    pub fn new(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// The failure every `update()` must report when the device is closed.
    pub fn not_open(origin: impl Into<String>) -> Self {
        Self::new(origin, "device is not open")
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result of a device operation.
pub type Result<T> = std::result::Result<T, IoError>;

/// Failure loading a [`ManagerConfig`](crate::config::ManagerConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_origin_and_message() {
        let err = IoError::new("pad0", "pipe broken");
        assert_eq!(err.to_string(), "pad0: pipe broken");
        assert_eq!(err.origin(), "pad0");
        assert_eq!(err.message(), "pipe broken");
    }

    #[test]
    fn not_open_message() {
        assert_eq!(IoError::not_open("stick").to_string(), "stick: device is not open");
    }
}
