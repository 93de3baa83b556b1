use async_trait::async_trait;
use serde::de::IgnoredAny;
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

/// Gitea caps `limit` at 50 unless the server raises it
const GITEA_PAGE_SIZE: usize = 50;

#[derive(Debug, Deserialize)]
struct GiteaUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GiteaRepo {
    name: String,
    full_name: String,
    owner: GiteaUser,
    clone_url: Option<String>,
    html_url: String,
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

impl From<GiteaRepo> for ProviderRepository {
    fn from(repo: GiteaRepo) -> Self {
        let clone_url = repo
            .clone_url
            .unwrap_or_else(|| format!("{}.git", repo.html_url));
        ProviderRepository {
            name: repo.name,
            full_name: repo.full_name,
            owner: repo.owner.login,
            clone_url,
            ssh_url: repo.ssh_url.filter(|u| !u.is_empty()),
            default_branch: repo.default_branch.filter(|b| !b.is_empty()),
            is_private: repo.private,
            is_archived: repo.archived,
            is_fork: repo.fork,
            description: repo.description.filter(|d| !d.is_empty()),
        }
    }
}

/// Gitea `/api/v1` adapter
pub struct GiteaProvider {
    api: ApiClient,
    token: Option<String>,
    git: GitCommandRunner,
}

impl GiteaProvider {
    /// `host` is the instance root, e.g. `https://gitea.example.com`
    pub fn new(host: &str, token: Option<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let host = host.trim_end_matches('/');
        let base = if host.ends_with("/api/v1") {
            host.to_string()
        } else {
            format!("{}/api/v1", host)
        };

        Ok(Self {
            api: ApiClient::new(&base, token.clone(), AuthScheme::Token, timeout)?
                .with_page_size("limit", GITEA_PAGE_SIZE),
            token,
            git: GitCommandRunner::new(),
        })
    }

    pub fn api_url(&self) -> &str {
        self.api.base_url()
    }
}

#[async_trait]
impl ProviderService for GiteaProvider {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Gitea
    }

    async fn list_repositories(&self, owner: &str) -> Result<Vec<ProviderRepository>, ProviderError> {
        let org_path = format!("/orgs/{}/repos", owner);
        let repos: Vec<GiteaRepo> = match self.api.get_paginated(&org_path, &[]).await {
            Err(ProviderError::NotFound { .. }) => {
                tracing::debug!("{} is not a Gitea organization, listing as a user", owner);
                self.api
                    .get_paginated(&format!("/users/{}/repos", owner), &[])
                    .await
                    .map_err(|e| match e {
                        ProviderError::NotFound { .. } => {
                            ProviderError::not_found(format!("Gitea owner {}", owner))
                        }
                        other => other,
                    })?
            }
            other => other?,
        };

        Ok(repos.into_iter().map(ProviderRepository::from).collect())
    }

    async fn get_default_branch(&self, owner: &str, repo: &str) -> Result<String, ProviderError> {
        let repo: GiteaRepo = self
            .api
            .get_json(&format!("/repos/{}/{}", owner, repo), &[])
            .await?;
        Ok(repo
            .default_branch
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| "main".to_string()))
    }

    async fn validate_token(&self) -> Result<(), ProviderError> {
        if !self.api.has_token() {
            return Err(ProviderError::auth("no Gitea token configured"));
        }
        let _user: IgnoredAny = self.api.get_json("/user", &[]).await?;
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        self.api.is_reachable("/version").await
    }
}

#[async_trait]
impl ProviderCloner for GiteaProvider {
    async fn clone_organization(
        &self,
        owner: &str,
        target: &Path,
        options: &CloneOptions,
        filter: &RepositoryFilter,
    ) -> Result<(), ProviderError> {
        let repos = self.list_repositories(owner).await?;
        let source = CloneSource {
            provider: ProviderType::Gitea,
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
        tracing::debug!("Refreshing Gitea owner {} in {}", owner, target.display());
        refresh_existing(&self.git, target, strategy).await
    }
}
