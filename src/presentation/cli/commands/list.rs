use anyhow::Result;
use colored::Colorize;

use super::render_structured;
use crate::application::use_cases::{ListRepositoriesResult, ListRepositoriesUseCase};
use crate::domain::entities::repository_filter::RepositoryFilter;
use crate::domain::entities::synclone_config::ProviderConfigBuilder;
use crate::domain::value_objects::provider_type::ProviderType;
use crate::infrastructure::provider::ProviderFactory;
use crate::presentation::cli::OutputFormat;

/// Handler for the list command
pub struct ListCommand {
    pub provider: ProviderType,
    pub org: String,
    pub token: Option<String>,
    pub api_url: Option<String>,
    pub visibility: String,
    pub pattern: Option<String>,
    pub exclude: Vec<String>,
    pub skip_archived: bool,
    pub skip_forks: bool,
    pub output: OutputFormat,
}

impl ListCommand {
    pub async fn execute(&self) -> Result<()> {
        let filter = RepositoryFilter::new(
            &self.visibility,
            self.pattern.as_deref(),
            self.exclude.clone(),
        )?
        .with_archived(!self.skip_archived)
        .with_forks(!self.skip_forks);

        let token = self
            .token
            .clone()
            .or_else(|| std::env::var(self.provider.token_env_var()).ok());

        let mut builder = ProviderConfigBuilder::new();
        if let Some(token) = token {
            builder = builder.with_token(token);
        }
        if let Some(api_url) = &self.api_url {
            builder = builder.with_api_url(api_url.clone());
        }

        let provider = ProviderFactory::new().create_provider(self.provider, &builder.build())?;
        let result = ListRepositoriesUseCase::new(provider)
            .execute(&self.org, &filter)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to list {}/{}: {}", self.provider, self.org, e))?;

        match render_structured(&result, self.output)? {
            Some(rendered) => println!("{}", rendered),
            None => print_listing(&result),
        }
        Ok(())
    }
}

fn print_listing(result: &ListRepositoriesResult) {
    for repo in &result.repositories {
        let marker = if repo.is_private {
            "private".yellow()
        } else {
            "public".green()
        };
        print!("{} [{}]", repo.name.bold(), marker);
        if repo.is_archived {
            print!(" {}", "archived".dimmed());
        }
        if repo.is_fork {
            print!(" {}", "fork".dimmed());
        }
        if let Some(description) = repo.description.as_deref().filter(|d| !d.is_empty()) {
            print!(" - {}", description);
        }
        println!();
    }

    println!();
    println!("{} {}", "filter:".blue().bold(), result.filter);
    println!("{} {}", "all:".blue().bold(), result.total.summary());
    println!("{} {}", "kept:".blue().bold(), result.filtered.summary());
}
