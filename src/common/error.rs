use std::path::PathBuf;
use thiserror::Error;

use crate::domain::entities::repository_filter::FilterError;
use crate::domain::entities::synclone_config::ConfigError;
use crate::infrastructure::provider::provider_interface::ProviderError;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum SyncloneError {
    /// Visibility, pattern or exclusion setup failed
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// A hosting provider call or adapter construction failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The configuration model is inconsistent
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reading or writing a configuration file failed
    #[error("Configuration file error: {message}")]
    ConfigStoreError {
        /// What went wrong
        message: String,
        /// File involved, when known
        path: Option<PathBuf>,
    },

    /// Local filesystem failure
    #[error("File system operation failed: {message}")]
    FileSystemError {
        /// What went wrong
        message: String,
        /// Path involved, when known
        path: Option<PathBuf>,
        /// Underlying I/O error
        #[source]
        source: Option<std::io::Error>,
    },

    /// A batch could not start at all
    #[error("Bulk operation error: {message}")]
    BulkOperationError {
        /// What went wrong
        message: String,
    },

    /// Field level validation failure
    #[error("Validation error: {field} - {message}")]
    ValidationError {
        /// Offending field
        field: String,
        /// What is wrong with it
        message: String,
        /// Offending value, when printable
        value: Option<String>,
    },

    /// YAML or JSON encoding failure
    #[error("Serialization error: {message}")]
    SerializationError {
        /// What went wrong
        message: String,
        /// Underlying encoder error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An awaited operation exceeded its deadline
    #[error("Operation timed out after {timeout_secs} seconds")]
    Timeout {
        /// Deadline that was exceeded
        timeout_secs: u64,
    },

    /// Unexpected internal failure
    #[error("Internal error: {message}")]
    InternalError {
        /// What went wrong
        message: String,
        /// Underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

#[allow(missing_docs)]
impl SyncloneError {
    pub fn config_store_error(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::ConfigStoreError {
            message: message.into(),
            path,
        }
    }

    pub fn filesystem_error(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: None,
        }
    }

    pub fn filesystem_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: Some(source),
        }
    }

    pub fn bulk_operation_error(message: impl Into<String>) -> Self {
        Self::BulkOperationError {
            message: message.into(),
        }
    }

    pub fn validation_error(
        field: impl Into<String>,
        message: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
            value,
        }
    }

    pub fn serialization_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::SerializationError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn timeout(timeout_secs: u64) -> Self {
        Self::Timeout { timeout_secs }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
            source: None,
        }
    }
}

impl From<std::io::Error> for SyncloneError {
    fn from(error: std::io::Error) -> Self {
        Self::filesystem_error_with_source("File system operation failed", None, error)
    }
}

impl From<serde_yaml::Error> for SyncloneError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::serialization_error_with_source("YAML serialization failed", error)
    }
}

impl From<serde_json::Error> for SyncloneError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization_error_with_source("JSON serialization failed", error)
    }
}

impl From<validator::ValidationErrors> for SyncloneError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Config(ConfigError::from(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::visibility::VisibilityError;

    #[test]
    fn test_filesystem_error_with_path() {
        let path = PathBuf::from("/test/path");
        let error = SyncloneError::filesystem_error("test message", Some(path.clone()));
        if let SyncloneError::FileSystemError { path: Some(p), .. } = error {
            assert_eq!(p, path);
        } else {
            panic!("Expected FileSystemError with path");
        }
    }

    #[test]
    fn test_validation_error() {
        let error = SyncloneError::validation_error("field", "message", Some("value".to_string()));
        assert_eq!(error.to_string(), "Validation error: field - message");
    }

    #[test]
    fn test_timeout_error() {
        let error = SyncloneError::timeout(30);
        assert_eq!(error.to_string(), "Operation timed out after 30 seconds");
    }

    #[test]
    fn test_error_conversion_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: SyncloneError = io_error.into();
        assert!(matches!(error, SyncloneError::FileSystemError { .. }));
    }

    #[test]
    fn test_filter_error_is_transparent() {
        let filter_error =
            FilterError::from(VisibilityError::InvalidVisibility("secret".to_string()));
        let expected = filter_error.to_string();
        let error: SyncloneError = filter_error.into();
        assert!(matches!(error, SyncloneError::Filter(_)));
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_provider_error_conversion() {
        let error: SyncloneError = ProviderError::unsupported("bitbucket").into();
        assert!(matches!(error, SyncloneError::Provider(_)));
        assert!(error.to_string().contains("bitbucket"));
    }
}
