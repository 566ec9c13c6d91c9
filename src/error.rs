//! Unified error hierarchy for healthsync
//!
//! Every failure mode has a typed variant here. Most of them never reach the
//! user: storage and notification failures are logged and swallowed by the
//! application layer, AI failures are replaced by local fallbacks. Only
//! validation errors halt a user-initiated action.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all healthsync operations
#[derive(Debug, Error)]
pub enum HealthSyncError {
    /// Key/value persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// User input rejected before any mutation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// AI chat-completion errors
    #[error("AI error: {0}")]
    Ai(#[from] AiError),

    /// File export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Notification dispatch errors
    #[error("Notification error: {0}")]
    Notification(#[from] NotifyError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key/value persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backing database could not be opened
    #[error("Could not open store at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    /// Read of a key failed
    #[error("Read failed for key {key}: {reason}")]
    ReadFailed { key: String, reason: String },

    /// Write of a key failed
    #[error("Write failed for key {key}: {reason}")]
    WriteFailed { key: String, reason: String },

    /// Stored value is not valid JSON for the expected shape
    #[error("Corrupt value under key {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// Write-behind worker is gone
    #[error("Storage worker unavailable")]
    WorkerGone,

    /// Underlying SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// User-input validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is empty
    #[error("Please enter your {field}")]
    Required { field: &'static str },

    /// A required value is missing, phrased without "your"
    #[error("Please enter {what}")]
    Missing { what: &'static str },

    /// A field is present but malformed
    #[error("Please enter a valid {field}")]
    Invalid { field: &'static str },

    /// A numeric field must be strictly positive
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    /// Password shorter than the minimum
    #[error("Password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    /// Password and confirmation differ
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Unknown metric field name
    #[error("Unknown metric field: {0}")]
    UnknownField(String),
}

/// AI chat-completion errors
#[derive(Debug, Error)]
pub enum AiError {
    /// No API key configured
    #[error("AI API key not configured (set {env_var})")]
    NotConfigured { env_var: String },

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the endpoint
    #[error("AI API error: {status} - {body}")]
    Status { status: u16, body: String },

    /// Response carried no completion text
    #[error("Empty completion")]
    EmptyCompletion,

    /// Completion text did not contain the expected JSON
    #[error("Invalid response format: {0}")]
    Extract(#[from] ExtractError),
}

/// Errors from pulling typed JSON out of free-form model output
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No bracketed span of the expected kind
    #[error("no JSON {kind} found in response")]
    NotFound { kind: &'static str },

    /// Span found but it does not match the schema
    #[error("JSON did not match expected schema: {0}")]
    Schema(#[from] serde_json::Error),

    /// Parsed value failed semantic checks
    #[error("{0}")]
    Rejected(String),
}

/// File export errors
#[derive(Debug, Error)]
pub enum ExportError {
    /// Unsupported format name
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Unsupported export kind name
    #[error("Unsupported export kind: {0}")]
    UnsupportedKind(String),

    /// IO failure while writing
    #[error("Export failed to {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    /// Serialization failure
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Notification dispatch errors
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Backend refused or failed to deliver
    #[error("Notification dispatch failed: {0}")]
    DispatchFailed(String),
}

/// Result type alias for healthsync operations
pub type Result<T> = std::result::Result<T, HealthSyncError>;

impl HealthSyncError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            HealthSyncError::Storage(StorageError::WriteFailed { .. })
                | HealthSyncError::Storage(StorageError::ReadFailed { .. })
                | HealthSyncError::Ai(AiError::Http(_))
                | HealthSyncError::Io(_)
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HealthSyncError::Validation(_) => ErrorSeverity::Warning,
            HealthSyncError::Ai(_) => ErrorSeverity::Warning,
            HealthSyncError::Notification(_) => ErrorSeverity::Info,
            HealthSyncError::Storage(StorageError::OpenFailed { .. }) => ErrorSeverity::Critical,
            HealthSyncError::Storage(_) => ErrorSeverity::Error,
            HealthSyncError::Configuration(_) => ErrorSeverity::Error,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            HealthSyncError::Validation(e) => e.to_string(),
            HealthSyncError::Storage(StorageError::OpenFailed { path, .. }) => {
                format!("Unable to open health data at {}", path.display())
            }
            HealthSyncError::Ai(AiError::NotConfigured { .. }) => {
                "AI features are not configured. Using built-in suggestions.".to_string()
            }
            HealthSyncError::Ai(_) => {
                "I'm having trouble connecting right now. Please try again later.".to_string()
            }
            HealthSyncError::Export(ExportError::WriteFailed { path, .. }) => {
                format!("Could not write export file: {}", path.display())
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical error, the session cannot continue
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
    /// Informational message
    Info,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Info => tracing::Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = HealthSyncError::Validation(ValidationError::Required { field: "name" });
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = HealthSyncError::Storage(StorageError::OpenFailed {
            path: PathBuf::from("/nope/health.db"),
            reason: "denied".to_string(),
        });
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_error_retryable() {
        let err = HealthSyncError::Storage(StorageError::WriteFailed {
            key: "k".to_string(),
            reason: "disk full".to_string(),
        });
        assert!(err.is_retryable());

        let err = HealthSyncError::Validation(ValidationError::PasswordMismatch);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_user_messages() {
        let err = HealthSyncError::Validation(ValidationError::Required { field: "email" });
        assert_eq!(err.user_message(), "Please enter your email");

        let err = HealthSyncError::Ai(AiError::NotConfigured {
            env_var: "HEALTHSYNC_AI_API_KEY".to_string(),
        });
        assert!(err.user_message().contains("not configured"));
    }
}
