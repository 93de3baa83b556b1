use std::sync::Arc;
use std::time::Duration;

use super::gitea::GiteaProvider;
use super::github::GitHubProvider;
use super::gitlab::GitLabProvider;
use super::provider_interface::{GitProvider, ProviderClientFactory, ProviderError};
use crate::domain::entities::synclone_config::ProviderConfig;
use crate::domain::value_objects::provider_type::ProviderType;

/// Factory for provider adapters, keyed by provider name
#[derive(Debug, Clone)]
pub struct ProviderFactory {
    http_timeout: Duration,
}

impl Default for ProviderFactory {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl ProviderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeout applied to every API request made by created adapters
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Create an adapter for `provider_type`
    pub fn create_provider(
        &self,
        provider_type: ProviderType,
        config: &ProviderConfig,
    ) -> Result<Arc<dyn GitProvider>, ProviderError> {
        let token = config.token.clone().filter(|t| !t.is_empty());
        let api_url = config.api_url.as_deref();

        match provider_type {
            ProviderType::Github => Ok(Arc::new(GitHubProvider::new(
                api_url,
                token,
                self.http_timeout,
            )?)),
            ProviderType::Gitlab => Ok(Arc::new(GitLabProvider::new(
                api_url,
                token,
                self.http_timeout,
            )?)),
            ProviderType::Gitea => {
                let host = api_url
                    .ok_or_else(|| ProviderError::config("Gitea requires an api_url"))?;
                Ok(Arc::new(GiteaProvider::new(host, token, self.http_timeout)?))
            }
        }
    }

    /// Names accepted by [`ProviderClientFactory::create`]
    pub fn supported_providers() -> Vec<&'static str> {
        ProviderType::ALL.iter().map(|p| p.as_str()).collect()
    }
}

impl ProviderClientFactory for ProviderFactory {
    fn create(
        &self,
        name: &str,
        config: &ProviderConfig,
    ) -> Result<Arc<dyn GitProvider>, ProviderError> {
        let provider_type: ProviderType = name
            .parse()
            .map_err(|_| ProviderError::unsupported(name))?;
        self.create_provider(provider_type, config)
    }
}
