use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;

use crate::domain::entities::repository::ProviderRepository;
use crate::domain::entities::repository_filter::RepositoryFilter;
use crate::domain::entities::synclone_config::ProviderConfig;
use crate::domain::value_objects::clone_strategy::CloneStrategy;
use crate::domain::value_objects::provider_type::ProviderType;
use crate::infrastructure::git::GitError;

/// Read-only view of a hosting provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderService: Send + Sync {
    fn provider_type(&self) -> ProviderType;

    /// Every repository owned by `owner`, following pagination
    async fn list_repositories(&self, owner: &str) -> Result<Vec<ProviderRepository>, ProviderError>;

    async fn get_default_branch(&self, owner: &str, repo: &str) -> Result<String, ProviderError>;

    /// Check that the configured token is accepted
    async fn validate_token(&self) -> Result<(), ProviderError>;

    /// Whether the API endpoint answers at all
    async fn is_healthy(&self) -> bool;
}

/// How an organization clone treats working copies already on disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloneOptions {
    /// Update strategy for repositories that are already cloned
    pub strategy: CloneStrategy,
    /// Remove working copies under the target that the filter no longer selects
    pub cleanup_orphans: bool,
}

impl CloneOptions {
    pub fn new(strategy: CloneStrategy) -> Self {
        Self {
            strategy,
            cleanup_orphans: false,
        }
    }

    pub fn with_cleanup_orphans(mut self, cleanup: bool) -> Self {
        self.cleanup_orphans = cleanup;
        self
    }
}

/// Clone and refresh operations backed by a hosting provider
#[async_trait]
pub trait ProviderCloner: Send + Sync {
    /// Clone every repository of `owner` accepted by `filter` into `target`.
    /// Repositories already present are updated with `options.strategy`.
    async fn clone_organization(
        &self,
        owner: &str,
        target: &Path,
        options: &CloneOptions,
        filter: &RepositoryFilter,
    ) -> Result<(), ProviderError>;

    /// Update every working copy found directly under `target`
    async fn refresh_all(
        &self,
        target: &Path,
        owner: &str,
        strategy: CloneStrategy,
    ) -> Result<(), ProviderError>;
}

/// A provider that can both list and clone
pub trait GitProvider: ProviderService + ProviderCloner {}

impl<T: ProviderService + ProviderCloner> GitProvider for T {}

/// Builds provider clients from configuration
pub trait ProviderClientFactory: Send + Sync {
    fn create(
        &self,
        name: &str,
        config: &ProviderConfig,
    ) -> Result<Arc<dyn GitProvider>, ProviderError>;
}

/// Errors raised by provider adapters
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Rate limit exceeded{}", format_reset(.reset_at))]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("{failed} of {total} repositories failed: {details}")]
    RepositoryFailures {
        failed: usize,
        total: usize,
        details: String,
    },

    #[error("Provider configuration error: {message}")]
    Config { message: String },

    #[error("Unsupported provider '{name}'. Supported providers are: github, gitlab, gitea")]
    UnsupportedProvider { name: String },
}

fn format_reset(reset_at: &Option<DateTime<Utc>>) -> String {
    reset_at
        .map(|t| format!(". Resets at {}", t))
        .unwrap_or_default()
}

impl ProviderError {
    #[inline]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    #[inline]
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    #[inline]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    #[inline]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    #[inline]
    pub fn unsupported(name: impl Into<String>) -> Self {
        Self::UnsupportedProvider { name: name.into() }
    }

    /// Short category used to aggregate failures
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Network { .. } => "network",
            ProviderError::Authentication { .. } => "auth",
            ProviderError::NotFound { .. } => "not_found",
            ProviderError::RateLimited { .. } => "rate_limited",
            ProviderError::Api { .. } => "api",
            ProviderError::Git(_) | ProviderError::RepositoryFailures { .. } => "git",
            ProviderError::Config { .. } => "config",
            ProviderError::UnsupportedProvider { .. } => "unsupported",
        }
    }

    /// Whether retrying later could succeed
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Network { .. } | ProviderError::RateLimited { .. }
        )
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            return ProviderError::api(status.as_u16(), error.to_string());
        }
        ProviderError::network(error.to_string())
    }
}

impl From<url::ParseError> for ProviderError {
    fn from(error: url::ParseError) -> Self {
        ProviderError::config(format!("Invalid URL: {}", error))
    }
}
