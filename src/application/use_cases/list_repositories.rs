use serde::Serialize;
use std::sync::Arc;

use crate::domain::entities::repository::{ProviderRepository, VisibilityRepository};
use crate::domain::entities::repository_filter::RepositoryFilter;
use crate::domain::entities::visibility_statistics::VisibilityStatistics;
use crate::infrastructure::provider::{ProviderError, ProviderService};

/// Repositories of one owner after filtering
#[derive(Debug, Clone, Serialize)]
pub struct ListRepositoriesResult {
    pub owner: String,
    pub filter: String,
    /// Kept repositories in provider order
    pub repositories: Vec<ProviderRepository>,
    /// Statistics over everything the provider returned
    pub total: VisibilityStatistics,
    /// Statistics over the kept repositories
    pub filtered: VisibilityStatistics,
}

/// List an organization and apply a [`RepositoryFilter`]
pub struct ListRepositoriesUseCase<P: ProviderService + ?Sized> {
    provider: Arc<P>,
}

impl<P: ProviderService + ?Sized> ListRepositoriesUseCase<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    pub async fn execute(
        &self,
        owner: &str,
        filter: &RepositoryFilter,
    ) -> Result<ListRepositoriesResult, ProviderError> {
        let all = self.provider.list_repositories(owner).await?;

        let views: Vec<VisibilityRepository> = all.iter().map(VisibilityRepository::from).collect();
        let total = VisibilityStatistics::calculate(&views);

        let repositories: Vec<ProviderRepository> = all
            .into_iter()
            .zip(views.iter())
            .filter(|(_, view)| filter.should_include_repository(view))
            .map(|(repo, _)| repo)
            .collect();

        let kept: Vec<VisibilityRepository> =
            repositories.iter().map(VisibilityRepository::from).collect();
        let filtered = VisibilityStatistics::calculate(&kept);

        tracing::debug!(
            "{}: kept {} of {} repositories ({})",
            owner,
            filtered.total_repositories,
            total.total_repositories,
            filter.filter_summary()
        );

        Ok(ListRepositoriesResult {
            owner: owner.to_string(),
            filter: filter.filter_summary(),
            repositories,
            total,
            filtered,
        })
    }
}
