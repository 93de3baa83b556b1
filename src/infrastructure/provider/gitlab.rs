use async_trait::async_trait;
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::form_urlencoded::byte_serialize;

use super::http::{ApiClient, AuthScheme};
use super::provider_interface::{CloneOptions, ProviderCloner, ProviderError, ProviderService};
use super::sync::{clone_filtered, refresh_existing, CloneSource};
use crate::domain::entities::repository::ProviderRepository;
use crate::domain::entities::repository_filter::RepositoryFilter;
use crate::domain::value_objects::clone_strategy::CloneStrategy;
use crate::domain::value_objects::provider_type::ProviderType;
use crate::infrastructure::git::GitCommandRunner;

#[derive(Debug, Deserialize)]
struct GitlabNamespace {
    full_path: String,
}

#[derive(Debug, Deserialize)]
struct GitlabProject {
    path: String,
    path_with_namespace: String,
    namespace: GitlabNamespace,
    http_url_to_repo: String,
    ssh_url_to_repo: Option<String>,
    default_branch: Option<String>,
    #[serde(default)]
    visibility: Option<String>,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    forked_from_project: Option<serde_json::Value>,
    description: Option<String>,
}

impl From<GitlabProject> for ProviderRepository {
    fn from(project: GitlabProject) -> Self {
        // internal projects are not visible anonymously
        let is_private = project.visibility.as_deref() != Some("public");
        ProviderRepository {
            name: project.path,
            full_name: project.path_with_namespace,
            owner: project.namespace.full_path,
            clone_url: project.http_url_to_repo,
            ssh_url: project.ssh_url_to_repo,
            default_branch: project.default_branch,
            is_private,
            is_archived: project.archived,
            is_fork: project.forked_from_project.is_some(),
            description: project.description,
        }
    }
}

fn encode_path(path: &str) -> String {
    byte_serialize(path.as_bytes()).collect()
}

/// API root for a GitLab instance URL, appending `/api/v4` when missing
fn api_root(instance_url: &str) -> String {
    let trimmed = instance_url.trim_end_matches('/');
    if trimmed.ends_with("/api/v4") {
        trimmed.to_string()
    } else {
        format!("{}/api/v4", trimmed)
    }
}

/// GitLab REST v4 adapter. Groups are listed with their subgroups.
pub struct GitLabProvider {
    api: ApiClient,
    token: Option<String>,
    git: GitCommandRunner,
}

impl GitLabProvider {
    pub fn new(
        api_url: Option<&str>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let instance = api_url
            .or(ProviderType::Gitlab.default_api_url())
            .ok_or_else(|| ProviderError::config("GitLab URL is missing"))?;

        Ok(Self {
            api: ApiClient::new(&api_root(instance), token.clone(), AuthScheme::PrivateToken, timeout)?,
            token,
            git: GitCommandRunner::new(),
        })
    }

    pub fn api_url(&self) -> &str {
        self.api.base_url()
    }
}

#[async_trait]
impl ProviderService for GitLabProvider {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Gitlab
    }

    async fn list_repositories(&self, owner: &str) -> Result<Vec<ProviderRepository>, ProviderError> {
        let path = format!("/groups/{}/projects", encode_path(owner));
        let projects: Vec<GitlabProject> = self
            .api
            .get_paginated(&path, &[("include_subgroups", "true".to_string())])
            .await
            .map_err(|e| match e {
                ProviderError::NotFound { .. } => {
                    ProviderError::not_found(format!("GitLab group {}", owner))
                }
                other => other,
            })?;

        Ok(projects.into_iter().map(ProviderRepository::from).collect())
    }

    async fn get_default_branch(&self, owner: &str, repo: &str) -> Result<String, ProviderError> {
        let path = format!("/projects/{}", encode_path(&format!("{}/{}", owner, repo)));
        let project: GitlabProject = self.api.get_json(&path, &[]).await?;
        Ok(project.default_branch.unwrap_or_else(|| "main".to_string()))
    }

    async fn validate_token(&self) -> Result<(), ProviderError> {
        if !self.api.has_token() {
            return Err(ProviderError::auth("no GitLab token configured"));
        }
        let _user: IgnoredAny = self.api.get_json("/user", &[]).await?;
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        self.api.is_reachable("/version").await
    }
}

#[async_trait]
impl ProviderCloner for GitLabProvider {
    async fn clone_organization(
        &self,
        owner: &str,
        target: &Path,
        options: &CloneOptions,
        filter: &RepositoryFilter,
    ) -> Result<(), ProviderError> {
        let repos = self.list_repositories(owner).await?;
        let source = CloneSource {
            provider: ProviderType::Gitlab,
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
        tracing::debug!("Refreshing GitLab group {} in {}", owner, target.display());
        refresh_existing(&self.git, target, strategy).await
    }
}
