use crate::common::error::SyncloneError;

/// Result alias used throughout the crate
///
/// # Examples
///
/// ```
/// use synclone::common::result::SyncloneResult;
/// use synclone::common::error::SyncloneError;
///
/// fn example_function() -> SyncloneResult<String> {
///     Ok("success".to_string())
/// }
///
/// fn example_with_error() -> SyncloneResult<()> {
///     Err(SyncloneError::internal_error("Something went wrong"))
/// }
/// ```
pub type SyncloneResult<T> = Result<T, SyncloneError>;

/// Conversions from `Option` into [`SyncloneResult`]
pub trait OptionExt<T> {
    /// Turn `None` into an internal error carrying `message`
    ///
    /// ```
    /// use synclone::common::result::{SyncloneResult, OptionExt};
    ///
    /// let none_value: Option<String> = None;
    /// let result: SyncloneResult<String> = none_value.ok_or_internal_error("Value not found");
    /// assert!(result.is_err());
    /// ```
    fn ok_or_internal_error(self, message: impl Into<String>) -> SyncloneResult<T>;

    /// Turn `None` into a validation error on `field`
    fn ok_or_validation_error(
        self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> SyncloneResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_internal_error(self, message: impl Into<String>) -> SyncloneResult<T> {
        self.ok_or_else(|| SyncloneError::internal_error(message))
    }

    fn ok_or_validation_error(
        self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> SyncloneResult<T> {
        self.ok_or_else(|| SyncloneError::validation_error(field, message, None))
    }
}

/// Conversions from foreign `Result`s into [`SyncloneResult`]
pub trait ResultExt<T, E> {
    /// Wrap an I/O failure with a message and the path it concerns
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> SyncloneResult<T>
    where
        E: Into<std::io::Error>;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> SyncloneResult<T>
    where
        E: Into<std::io::Error>,
    {
        self.map_err(|e| SyncloneError::filesystem_error_with_source(message, path, e.into()))
    }
}

/// Helpers for async call sites
pub mod async_helpers {
    use super::{SyncloneError, SyncloneResult};
    use std::future::Future;

    /// Await `f`, failing with [`SyncloneError::Timeout`] after `timeout_secs`
    pub async fn with_timeout<F, T>(f: F, timeout_secs: u64) -> SyncloneResult<T>
    where
        F: Future<Output = SyncloneResult<T>>,
    {
        let timeout_duration = std::time::Duration::from_secs(timeout_secs);

        match tokio::time::timeout(timeout_duration, f).await {
            Ok(result) => result,
            Err(_) => Err(SyncloneError::timeout(timeout_secs)),
        }
    }
}
