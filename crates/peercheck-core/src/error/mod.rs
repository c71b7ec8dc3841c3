//! Error types and result aliases for peercheck operations.
//!
//! Domain outcomes (unsatisfied or unsatisfiable peer dependencies) are not
//! errors; this type covers the infrastructure around them with actionable
//! messages.

use thiserror::Error;

/// Unified error type for all peercheck operations
#[derive(Error, Debug)]
pub enum PeerCheckError {
    // Config errors
    #[error("Failed to parse {path}: {message}")]
    JsonParse { path: String, message: String },

    #[error("Failed to parse {path}: {message}")]
    TomlParse { path: String, message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    #[error("package.json missing: {path}")]
    ManifestNotFound { path: String },

    // Registry errors
    #[error("Package '{name}' not found in registry")]
    PackageNotFound { name: String },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Invalid version '{input}': {reason}")]
    InvalidVersion { input: String, reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for peercheck operations
pub type PeerCheckResult<T> = Result<T, PeerCheckError>;

impl PeerCheckError {
    /// Create a network error from any error type
    pub fn network<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Check if this error is worth retrying
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PeerCheckError::Network { .. } | PeerCheckError::Io { .. })
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            PeerCheckError::ManifestNotFound { .. } => {
                Some("Run peercheck from a project root, or pass --cwd <dir>")
            },
            PeerCheckError::PackageNotFound { .. } => {
                Some("Check the package name spelling or the configured registry")
            },
            PeerCheckError::Network { .. } => Some("Check your internet connection and try again"),
            PeerCheckError::ConfigValidation { .. } | PeerCheckError::TomlParse { .. } => {
                Some("Fix .peercheck.toml or the PEERCHECK_* environment variables")
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PeerCheckError::ManifestNotFound {
            path: "/tmp/app/package.json".to_string(),
        };
        assert_eq!(err.to_string(), "package.json missing: /tmp/app/package.json");
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_recoverable() {
        let err = PeerCheckError::network(
            "timed out".to_string(),
            std::io::Error::new(std::io::ErrorKind::TimedOut, "timeout"),
        );
        assert!(err.is_recoverable());
        assert!(!PeerCheckError::PackageNotFound { name: "x".into() }.is_recoverable());
    }
}
