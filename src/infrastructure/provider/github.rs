use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::http::{ApiClient, AuthScheme};
use super::provider_interface::{CloneOptions, ProviderCloner, ProviderError, ProviderService};
use super::sync::{clone_filtered, refresh_existing, CloneSource};
use crate::domain::entities::repository::ProviderRepository;
use crate::domain::entities::repository_filter::RepositoryFilter;
use crate::domain::value_objects::clone_strategy::CloneStrategy;
use crate::domain::value_objects::provider_type::ProviderType;
use crate::infrastructure::git::GitCommandRunner;

#[derive(Debug, Deserialize)]
struct GithubOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GithubRepo {
    name: String,
    full_name: String,
    owner: GithubOwner,
    clone_url: String,
    ssh_url: Option<String>,
    default_branch: Option<String>,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    fork: bool,
    description: Option<String>,
}

impl From<GithubRepo> for ProviderRepository {
    fn from(repo: GithubRepo) -> Self {
        ProviderRepository {
            name: repo.name,
            full_name: repo.full_name,
            owner: repo.owner.login,
            clone_url: repo.clone_url,
            ssh_url: repo.ssh_url,
            default_branch: repo.default_branch,
            is_private: repo.private,
            is_archived: repo.archived,
            is_fork: repo.fork,
            description: repo.description,
        }
    }
}

/// GitHub REST v3 adapter
pub struct GitHubProvider {
    api: ApiClient,
    token: Option<String>,
    git: GitCommandRunner,
}

impl GitHubProvider {
    pub fn new(
        api_url: Option<&str>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let base = api_url
            .or(ProviderType::Github.default_api_url())
            .ok_or_else(|| ProviderError::config("GitHub API URL is missing"))?;

        Ok(Self {
            api: ApiClient::new(base, token.clone(), AuthScheme::Bearer, timeout)?,
            token,
            git: GitCommandRunner::new(),
        })
    }

    pub fn api_url(&self) -> &str {
        self.api.base_url()
    }
}

#[async_trait]
impl ProviderService for GitHubProvider {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Github
    }

    async fn list_repositories(&self, owner: &str) -> Result<Vec<ProviderRepository>, ProviderError> {
        let org_path = format!("/orgs/{}/repos", owner);
        let repos: Vec<GithubRepo> = match self
            .api
            .get_paginated(&org_path, &[("type", "all".to_string())])
            .await
        {
            Err(ProviderError::NotFound { .. }) => {
                tracing::debug!("{} is not an organization, listing as a user", owner);
                let user_path = format!("/users/{}/repos", owner);
                self.api
                    .get_paginated(&user_path, &[("type", "owner".to_string())])
                    .await
                    .map_err(|e| match e {
                        ProviderError::NotFound { .. } => {
                            ProviderError::not_found(format!("GitHub owner {}", owner))
                        }
                        other => other,
                    })?
            }
            other => other?,
        };

        Ok(repos.into_iter().map(ProviderRepository::from).collect())
    }

    async fn get_default_branch(&self, owner: &str, repo: &str) -> Result<String, ProviderError> {
        let repo: GithubRepo = self
            .api
            .get_json(&format!("/repos/{}/{}", owner, repo), &[])
            .await?;
        Ok(repo.default_branch.unwrap_or_else(|| "main".to_string()))
    }

    async fn validate_token(&self) -> Result<(), ProviderError> {
        if !self.api.has_token() {
            return Err(ProviderError::auth("no GitHub token configured"));
        }
        let _user: GithubOwner = self.api.get_json("/user", &[]).await?;
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        self.api.is_reachable("/rate_limit").await
    }
}

#[async_trait]
impl ProviderCloner for GitHubProvider {
    async fn clone_organization(
        &self,
        owner: &str,
        target: &Path,
        options: &CloneOptions,
        filter: &RepositoryFilter,
    ) -> Result<(), ProviderError> {
        let repos = self.list_repositories(owner).await?;
        let source = CloneSource {
            provider: ProviderType::Github,
            owner,
            token: self.token.as_deref(),
        };
        clone_filtered(&self.git, &source, &repos, target, options, filter).await
    }

    async fn refresh_all(
        &self,
        target: &Path,
        owner: &str,
        strategy: CloneStrategy,
    ) -> Result<(), ProviderError> {
        tracing::debug!("Refreshing GitHub owner {} in {}", owner, target.display());
        refresh_existing(&self.git, target, strategy).await
    }
}
