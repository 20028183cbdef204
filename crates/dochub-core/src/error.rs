//! Error type shared by every DocHub crate.
//!
//! Stores, push adapters and handlers all return [`AppError`]; the HTTP
//! layer turns its [`ErrorKind`] into a status code.

use std::fmt;
use thiserror::Error;

/// What went wrong, independent of which crate noticed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A notification or user does not exist (or is not the caller's).
    NotFound,
    /// The caller's identity claim is missing or unknown.
    Authentication,
    /// The caller's role does not allow the action.
    Authorization,
    /// Request input was rejected.
    Validation,
    /// The request conflicts with the current setup, e.g. a disabled provider.
    Conflict,
    /// Anything else that failed inside the server.
    Internal,
    /// The database rejected or dropped a query.
    Database,
    /// Settings are missing or malformed.
    Configuration,
    /// JSON encoding or decoding failed.
    Serialization,
    /// A push provider answered with an error or could not be reached.
    ExternalService,
}

impl ErrorKind {
    /// Upper-case name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Authentication => "AUTHENTICATION",
            Self::Authorization => "AUTHORIZATION",
            Self::Validation => "VALIDATION",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL",
            Self::Database => "DATABASE",
            Self::Configuration => "CONFIGURATION",
            Self::Serialization => "SERIALIZATION",
            Self::ExternalService => "EXTERNAL_SERVICE",
        }
    }

    /// Whether the caller, rather than the server or a provider, is at fault.
    pub fn is_client_error(self) -> bool {
        matches!(
            self,
            Self::NotFound
                | Self::Authentication
                | Self::Authorization
                | Self::Validation
                | Self::Conflict
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A categorized failure with an optional cause.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// Category, drives the HTTP status.
    pub kind: ErrorKind,
    /// Message safe to show for client errors.
    pub message: String,
    /// Underlying library error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Build an error of `kind`.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Build an error of `kind` that keeps `source` for logging.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

macro_rules! kind_constructors {
    ($($name:ident => $kind:ident),* $(,)?) => {
        impl AppError {
            $(
                #[doc = concat!("Shorthand for `AppError::new(ErrorKind::", stringify!($kind), ", message)`.")]
                pub fn $name(message: impl Into<String>) -> Self {
                    Self::new(ErrorKind::$kind, message)
                }
            )*
        }
    };
}

kind_constructors! {
    not_found => NotFound,
    authentication => Authentication,
    authorization => Authorization,
    validation => Validation,
    conflict => Conflict,
    internal => Internal,
    database => Database,
    configuration => Configuration,
}

// The boxed source is not `Clone`; copies keep only kind and message.
impl Clone for AppError {
    fn clone(&self) -> Self {
        Self::new(self.kind, self.message.clone())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorKind::Serialization, format!("Invalid JSON: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::not_found("User not found");
        assert_eq!(err.to_string(), "NOT_FOUND: User not found");
    }

    #[test]
    fn test_clone_drops_source() {
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AppError::from(json);
        assert!(err.source.is_some());
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::Serialization);
        assert!(cloned.source.is_none());
    }

    #[test]
    fn test_client_errors() {
        assert!(ErrorKind::Conflict.is_client_error());
        assert!(ErrorKind::Authentication.is_client_error());
        assert!(!ErrorKind::ExternalService.is_client_error());
        assert!(!ErrorKind::Database.is_client_error());
    }
}
