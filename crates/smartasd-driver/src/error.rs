//! Error types for SmartASD operations.
//!
//! The vendor driver only ever answers with an integer status (0 on
//! success) or an empty scan list. This module turns those answers into a
//! typed error while keeping the raw status around, since the meaning of
//! individual codes is not documented by the vendor.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::api::{Operation, Status};

/// Result type alias for SmartASD operations.
pub type Result<T> = std::result::Result<T, SmartAsdError>;

/// Errors that can occur when working with SmartASD boards.
#[derive(Error, Debug)]
pub enum SmartAsdError {
    /// Scan returned no device, or none matched the requested name
    #[error("No SmartASD device matching '{pattern}' found")]
    DeviceNotFound { pattern: String },

    /// `SmartOpen` returned a nonzero status
    #[error("Failed to open device '{device}' (status {code})")]
    OpenFailed { device: String, code: Status },

    /// `SmartGetAll` gave up after waiting the full timeout
    #[error("No input snapshot from '{device}' within {timeout:?} (status {code})")]
    Timeout {
        device: String,
        timeout: Duration,
        code: Status,
    },

    /// Any other nonzero status from the driver
    #[error("Driver error during {operation} on '{device}' (status {code})")]
    Driver {
        operation: Operation,
        device: String,
        code: Status,
    },

    /// The handle was closed and may not be used again
    #[error("Device '{device}' is closed")]
    DeviceClosed { device: String },

    /// Output channel outside the 32-bit output word
    #[error("Invalid channel {channel}: board has {max} output channels")]
    InvalidChannel { channel: u32, max: u32 },

    /// Invalid parameter passed to the binding
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Coarse classification of a [`SmartAsdError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DeviceNotFound,
    OpenFailed,
    Timeout,
    DriverError,
    DeviceClosed,
    InvalidArgument,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceNotFound => write!(f, "device not found"),
            Self::OpenFailed => write!(f, "open failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::DriverError => write!(f, "driver error"),
            Self::DeviceClosed => write!(f, "device closed"),
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::Config => write!(f, "configuration"),
        }
    }
}

impl SmartAsdError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DeviceNotFound { .. } => ErrorKind::DeviceNotFound,
            Self::OpenFailed { .. } => ErrorKind::OpenFailed,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Driver { .. } => ErrorKind::DriverError,
            Self::DeviceClosed { .. } => ErrorKind::DeviceClosed,
            Self::InvalidChannel { .. } | Self::InvalidArgument { .. } => {
                ErrorKind::InvalidArgument
            }
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// Raw driver status carried by this error, if any.
    pub fn code(&self) -> Option<Status> {
        match self {
            Self::OpenFailed { code, .. }
            | Self::Timeout { code, .. }
            | Self::Driver { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Check if this is a "device not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DeviceNotFound { .. })
    }

    /// Check if this is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if the handle was already closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::DeviceClosed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SmartAsdError::InvalidChannel {
            channel: 40,
            max: 32,
        };
        assert!(err.to_string().contains("40"));
        assert!(err.to_string().contains("32"));

        let err = SmartAsdError::Driver {
            operation: Operation::SetAll,
            device: "SmartASD 1".to_string(),
            code: -7,
        };
        assert!(err.to_string().contains("SmartSetAll"));
        assert!(err.to_string().contains("-7"));
    }

    #[test]
    fn test_error_kinds() {
        let err = SmartAsdError::Timeout {
            device: "x".to_string(),
            timeout: Duration::from_millis(10),
            code: 1,
        };
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.code(), Some(1));
        assert!(err.is_timeout());

        let err = SmartAsdError::DeviceClosed {
            device: "x".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::DeviceClosed);
        assert_eq!(err.code(), None);

        let err = SmartAsdError::InvalidChannel { channel: 1, max: 0 };
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
