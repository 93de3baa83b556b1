use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use thiserror::Error;
use validator::Validate;

use crate::domain::entities::repository_filter::{FilterError, RepositoryFilter};
use crate::domain::value_objects::clone_strategy::CloneStrategy;
use crate::domain::value_objects::name_pattern::{compile_regex, is_glob_only};
use crate::domain::value_objects::provider_type::ProviderType;
use crate::domain::value_objects::visibility::{Visibility, VisibilityFilter};

/// Schema version written by [`ConfigBuilder`]
pub const CURRENT_CONFIG_VERSION: &str = "1.0.0";

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Unsupported provider '{0}'. Supported providers are: github, gitlab, gitea")]
    UnsupportedProvider(String),

    #[error("Default provider '{0}' is not configured")]
    MissingDefaultProvider(String),

    #[error("Provider '{provider}' has no API URL and no default one exists")]
    MissingApiUrl { provider: String },

    #[error("Invalid visibility '{value}' in {context}")]
    InvalidVisibility { context: String, value: String },

    #[error("Invalid strategy '{value}' in {context}")]
    InvalidStrategy { context: String, value: String },

    #[error("Invalid include pattern '{pattern}' in {context}: {message}")]
    InvalidPattern {
        context: String,
        pattern: String,
        message: String,
    },

    #[error("Organization '{organization}' is listed more than once for provider '{provider}'")]
    DuplicateOrganization {
        provider: String,
        organization: String,
    },
}

impl From<validator::ValidationErrors> for ConfigError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ConfigError::Invalid(errors.to_string())
    }
}

/// Per-target timeouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutSettings {
    /// Deadline for a whole clone or refresh target, unlimited when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_secs: Option<u64>,
    /// Deadline for a single provider API request
    #[serde(default = "default_http_secs")]
    pub http_secs: u64,
}

fn default_http_secs() -> u64 {
    30
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            operation_secs: None,
            http_secs: default_http_secs(),
        }
    }
}

/// Defaults applied to every provider and organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct GlobalSettings {
    /// Root under which organizations without `clone_dir` are cloned
    #[serde(default = "default_clone_base_dir")]
    #[validate(length(min = 1))]
    pub clone_base_dir: String,
    /// Strategy used when an organization does not set one
    #[serde(default = "default_strategy_name")]
    pub default_strategy: String,
    /// Visibility used when an organization does not set one
    #[serde(default = "default_visibility_name")]
    pub default_visibility: String,
    /// Exclude patterns applied to every organization
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_ignores: Vec<String>,
    #[serde(default)]
    pub timeouts: TimeoutSettings,
    /// Extra attempts for a target that failed with a network or rate-limit error
    #[serde(default)]
    pub max_retries: u32,
}

fn default_clone_base_dir() -> String {
    "~/repos".to_string()
}

fn default_strategy_name() -> String {
    CloneStrategy::default().to_string()
}

fn default_visibility_name() -> String {
    Visibility::default().to_string()
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            clone_base_dir: default_clone_base_dir(),
            default_strategy: default_strategy_name(),
            default_visibility: default_visibility_name(),
            global_ignores: Vec::new(),
            timeouts: TimeoutSettings::default(),
            max_retries: 0,
        }
    }
}

/// One organization, group or user to clone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct OrganizationConfig {
    #[validate(length(min = 1))]
    pub name: String,
    /// Explicit clone root; defaults to `<clone_base_dir>/<provider>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clone_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    /// Name pattern a repository must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    /// Clone repositories directly into the clone root instead of a per-organization directory
    #[serde(default)]
    pub flatten: bool,
    #[serde(default)]
    pub include_archived: bool,
    #[serde(default)]
    pub include_forks: bool,
    /// Delete working copies of repositories that are no longer selected
    #[serde(default)]
    pub cleanup_orphans: bool,
}

impl OrganizationConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clone_dir: None,
            visibility: None,
            strategy: None,
            include: None,
            exclude: Vec::new(),
            flatten: false,
            include_archived: false,
            include_forks: false,
            cleanup_orphans: false,
        }
    }

    pub fn with_clone_dir(mut self, clone_dir: impl Into<String>) -> Self {
        self.clone_dir = Some(clone_dir.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility.to_string());
        self
    }

    pub fn with_strategy(mut self, strategy: CloneStrategy) -> Self {
        self.strategy = Some(strategy.to_string());
        self
    }

    pub fn with_include(mut self, pattern: impl Into<String>) -> Self {
        self.include = Some(pattern.into());
        self
    }

    pub fn with_exclude(mut self, patterns: Vec<String>) -> Self {
        self.exclude = patterns;
        self
    }

    pub fn with_flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    pub fn with_include_archived(mut self, include: bool) -> Self {
        self.include_archived = include;
        self
    }

    pub fn with_include_forks(mut self, include: bool) -> Self {
        self.include_forks = include;
        self
    }

    pub fn with_cleanup_orphans(mut self, cleanup: bool) -> Self {
        self.cleanup_orphans = cleanup;
        self
    }

    /// Whether repositories land in the provider-wide root shared with other organizations
    pub fn shares_clone_root(&self) -> bool {
        self.flatten && self.clone_dir.is_none()
    }

    /// Directory this organization's repositories are cloned under
    pub fn resolve_clone_dir(&self, provider: &str, global: &GlobalSettings) -> PathBuf {
        let root = match &self.clone_dir {
            Some(dir) => PathBuf::from(dir),
            None => PathBuf::from(&global.clone_base_dir).join(provider),
        };

        if self.flatten {
            root
        } else {
            root.join(&self.name)
        }
    }

    /// Organization strategy, falling back to the global default
    pub fn effective_strategy(&self, global: &GlobalSettings) -> CloneStrategy {
        self.strategy
            .as_deref()
            .unwrap_or(&global.default_strategy)
            .parse()
            .unwrap_or_default()
    }

    /// Filter combining this organization's rules with the global ignores
    pub fn repository_filter(&self, global: &GlobalSettings) -> Result<RepositoryFilter, FilterError> {
        let visibility = self
            .visibility
            .as_deref()
            .unwrap_or(&global.default_visibility);

        let mut exclude = self.exclude.clone();
        exclude.extend(global.global_ignores.iter().cloned());

        Ok(RepositoryFilter::new(visibility, self.include.as_deref(), exclude)?
            .with_archived(self.include_archived)
            .with_forks(self.include_forks))
    }
}

/// Credentials, endpoint and organizations for one provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ProviderConfig {
    /// Access token; `${VAR}` references are expanded when loading from disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// API root for self-hosted instances
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub api_url: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub organizations: Vec<OrganizationConfig>,
}

impl ProviderConfig {
    pub fn find_organization(&self, name: &str) -> Option<&OrganizationConfig> {
        self.organizations.iter().find(|org| org.name == name)
    }
}

/// Root of the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SyncloneConfig {
    #[validate(length(min = 1))]
    pub version: String,
    #[serde(
        rename = "defaultProvider",
        alias = "default_provider",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_provider: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub global: GlobalSettings,
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
}

impl Default for SyncloneConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION.to_string(),
            default_provider: None,
            global: GlobalSettings::default(),
            providers: BTreeMap::new(),
        }
    }
}

impl SyncloneConfig {
    /// Structural and semantic validation
    pub fn validate_config(&self) -> Result<(), ConfigError> {
        self.validate()?;

        check_visibility("global settings", &self.global.default_visibility)?;
        check_strategy("global settings", &self.global.default_strategy)?;

        if let Some(default_provider) = &self.default_provider {
            if !self.providers.contains_key(default_provider) {
                return Err(ConfigError::MissingDefaultProvider(default_provider.clone()));
            }
        }

        for (name, provider) in &self.providers {
            let provider_type: ProviderType = name
                .parse()
                .map_err(|_| ConfigError::UnsupportedProvider(name.clone()))?;

            provider.validate()?;

            if provider.api_url.is_none() && provider_type.default_api_url().is_none() {
                return Err(ConfigError::MissingApiUrl {
                    provider: name.clone(),
                });
            }

            let mut seen = BTreeSet::new();
            for org in &provider.organizations {
                if !seen.insert(org.name.as_str()) {
                    return Err(ConfigError::DuplicateOrganization {
                        provider: name.clone(),
                        organization: org.name.clone(),
                    });
                }

                let context = format!("{}/{}", name, org.name);
                if let Some(visibility) = &org.visibility {
                    check_visibility(&context, visibility)?;
                }
                if let Some(strategy) = &org.strategy {
                    check_strategy(&context, strategy)?;
                }
                if let Some(include) = &org.include {
                    check_include(&context, include)?;
                }
            }
        }

        Ok(())
    }

    /// Provider names in deterministic order
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    /// Total number of configured organizations
    pub fn organization_count(&self) -> usize {
        self.providers.values().map(|p| p.organizations.len()).sum()
    }
}

fn check_visibility(context: &str, value: &str) -> Result<(), ConfigError> {
    VisibilityFilter::new(value)
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidVisibility {
            context: context.to_string(),
            value: value.to_string(),
        })
}

fn check_strategy(context: &str, value: &str) -> Result<(), ConfigError> {
    value
        .parse::<CloneStrategy>()
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidStrategy {
            context: context.to_string(),
            value: value.to_string(),
        })
}

fn check_include(context: &str, pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() || is_glob_only(pattern) {
        return Ok(());
    }

    compile_regex(pattern)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidPattern {
            context: context.to_string(),
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

/// Fluent construction of a [`ProviderConfig`]
#[derive(Debug, Default)]
pub struct ProviderConfigBuilder {
    config: ProviderConfig,
}

impl ProviderConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.config.api_url = Some(api_url.into());
        self
    }

    pub fn with_organization(mut self, organization: OrganizationConfig) -> Self {
        self.config.organizations.push(organization);
        self
    }

    pub fn build(self) -> ProviderConfig {
        self.config
    }
}

/// Fluent construction of a [`SyncloneConfig`]
///
/// ```
/// use synclone::domain::entities::synclone_config::{
///     ConfigBuilder, OrganizationConfig, ProviderConfigBuilder,
/// };
/// use synclone::domain::value_objects::visibility::Visibility;
///
/// let config = ConfigBuilder::new()
///     .with_default_provider("github")
///     .with_provider(
///         "github",
///         ProviderConfigBuilder::new()
///             .with_token("${GITHUB_TOKEN}")
///             .with_organization(OrganizationConfig::new("acme").with_visibility(Visibility::Public))
///             .build(),
///     )
///     .build()
///     .unwrap();
///
/// assert_eq!(config.organization_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: SyncloneConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    pub fn with_default_provider(mut self, provider: impl Into<String>) -> Self {
        self.config.default_provider = Some(provider.into());
        self
    }

    pub fn with_clone_base_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.global.clone_base_dir = dir.into();
        self
    }

    pub fn with_default_strategy(mut self, strategy: CloneStrategy) -> Self {
        self.config.global.default_strategy = strategy.to_string();
        self
    }

    pub fn with_default_visibility(mut self, visibility: Visibility) -> Self {
        self.config.global.default_visibility = visibility.to_string();
        self
    }

    pub fn with_global_ignores(mut self, patterns: Vec<String>) -> Self {
        self.config.global.global_ignores = patterns;
        self
    }

    pub fn with_operation_timeout(mut self, secs: u64) -> Self {
        self.config.global.timeouts.operation_secs = Some(secs);
        self
    }

    pub fn with_http_timeout(mut self, secs: u64) -> Self {
        self.config.global.timeouts.http_secs = secs;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.config.global.max_retries = retries;
        self
    }

    /// Add or replace a provider section
    pub fn with_provider(mut self, name: impl Into<String>, provider: ProviderConfig) -> Self {
        self.config.providers.insert(name.into(), provider);
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<SyncloneConfig, ConfigError> {
        self.config.validate_config()?;
        Ok(self.config)
    }
}
