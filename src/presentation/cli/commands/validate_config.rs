use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::entities::synclone_config::SyncloneConfig;
use crate::domain::value_objects::provider_type::ProviderType;
use crate::infrastructure::filesystem::config_store::ConfigStore;
use crate::infrastructure::provider::{ProviderError, ProviderFactory, ProviderService};

/// Handler for the validate-config command
pub struct ValidateConfigCommand {
    pub config: Option<PathBuf>,
    pub check_tokens: bool,
}

impl ValidateConfigCommand {
    pub fn new(config: Option<PathBuf>) -> Self {
        Self {
            config,
            check_tokens: false,
        }
    }

    pub fn with_token_check(mut self, check_tokens: bool) -> Self {
        self.check_tokens = check_tokens;
        self
    }

    pub async fn execute(&self) -> Result<()> {
        let (path, config) = ConfigStore::new()
            .load(self.config.as_deref())
            .await
            .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

        println!("{} {} is valid", "✓".green().bold(), path.display());
        println!(
            "  {} providers ({}), {} organizations",
            config.providers.len(),
            config.provider_names().join(", "),
            config.organization_count()
        );
        if let Some(default_provider) = &config.default_provider {
            println!("  default provider: {}", default_provider);
        }

        if !self.check_tokens {
            return Ok(());
        }

        let factory = ProviderFactory::new()
            .with_http_timeout(Duration::from_secs(config.global.timeouts.http_secs));
        let rejected = check_tokens(&config, &factory).await;

        if rejected.is_empty() {
            Ok(())
        } else {
            Err(anyhow::anyhow!("Token check failed for: {}", rejected.join(", ")))
        }
    }
}

async fn validate_provider_token(
    name: &str,
    config: &SyncloneConfig,
    factory: &ProviderFactory,
) -> Result<(), ProviderError> {
    let provider_type: ProviderType = name.parse().map_err(|_| ProviderError::unsupported(name))?;
    let provider_config = config
        .providers
        .get(name)
        .ok_or_else(|| ProviderError::config(format!("provider '{}' is not configured", name)))?;

    factory
        .create_provider(provider_type, provider_config)?
        .validate_token()
        .await
}

/// Ask each configured provider to accept its token. Returns the names that failed.
async fn check_tokens(config: &SyncloneConfig, factory: &ProviderFactory) -> Vec<String> {
    let mut rejected = Vec::new();

    for name in config.provider_names() {
        match validate_provider_token(name, config, factory).await {
            Ok(()) => println!("{} {} token accepted", "✓".green().bold(), name),
            Err(e) => {
                println!("{} {}: {}", "✗".red().bold(), name, e.to_string().red());
                rejected.push(name.to_string());
            }
        }
    }

    rejected
}
