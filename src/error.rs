// src/error.rs
//! Error types for the diagnostic pipeline

use std::fmt;

pub type Result<T> = std::result::Result<T, DiagError>;

#[derive(Debug)]
pub enum DiagError {
    Io(std::io::Error),
    Serial(tokio_serial::Error),
    Json(serde_json::Error),
    Connection(String),
    PermissionDenied(String),
    Unavailable(String),
    Config(String),
    Other(String),
}

impl DiagError {
    /// Whether the failure came from a missing permission rather than a fault
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, DiagError::PermissionDenied(_))
    }
}

impl fmt::Display for DiagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagError::Io(e) => write!(f, "IO error: {}", e),
            DiagError::Serial(e) => write!(f, "Serial error: {}", e),
            DiagError::Json(e) => write!(f, "JSON error: {}", e),
            DiagError::Connection(msg) => write!(f, "Connection error: {}", msg),
            DiagError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            DiagError::Unavailable(msg) => write!(f, "Service unavailable: {}", msg),
            DiagError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DiagError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DiagError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiagError::Io(e) => Some(e),
            DiagError::Serial(e) => Some(e),
            DiagError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DiagError {
    fn from(error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::PermissionDenied {
            DiagError::PermissionDenied(error.to_string())
        } else {
            DiagError::Io(error)
        }
    }
}

impl From<tokio_serial::Error> for DiagError {
    fn from(error: tokio_serial::Error) -> Self {
        DiagError::Serial(error)
    }
}

impl From<serde_json::Error> for DiagError {
    fn from(error: serde_json::Error) -> Self {
        DiagError::Json(error)
    }
}

impl From<anyhow::Error> for DiagError {
    fn from(error: anyhow::Error) -> Self {
        DiagError::Other(error.to_string())
    }
}
