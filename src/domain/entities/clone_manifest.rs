use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::repository::ProviderRepository;
use crate::domain::value_objects::clone_strategy::CloneStrategy;
use crate::domain::value_objects::provider_type::ProviderType;

/// File written at the root of every cloned organization
pub const MANIFEST_FILE_NAME: &str = ".synclone.yaml";

/// One selected repository as recorded in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    /// Clone URL without credentials
    pub clone_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    pub is_private: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_fork: bool,
}

impl From<&ProviderRepository> for ManifestEntry {
    fn from(repo: &ProviderRepository) -> Self {
        Self {
            name: repo.name.clone(),
            clone_url: repo.clone_url.clone(),
            default_branch: repo.default_branch.clone(),
            is_private: repo.is_private,
            is_archived: repo.is_archived,
            is_fork: repo.is_fork,
        }
    }
}

/// Record of what the last clone of an organization selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneManifest {
    pub provider: ProviderType,
    pub organization: String,
    pub strategy: CloneStrategy,
    pub generated_at: DateTime<Utc>,
    pub repositories: Vec<ManifestEntry>,
}

impl CloneManifest {
    pub fn new<'a>(
        provider: ProviderType,
        organization: impl Into<String>,
        strategy: CloneStrategy,
        repositories: impl IntoIterator<Item = &'a ProviderRepository>,
    ) -> Self {
        Self {
            provider,
            organization: organization.into(),
            strategy,
            generated_at: Utc::now(),
            repositories: repositories.into_iter().map(ManifestEntry::from).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.repositories.iter().any(|entry| entry.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_from_repositories() {
        let repos = vec![
            ProviderRepository::new("acme", "api", "https://example.com/acme/api.git", false)
                .with_default_branch("trunk"),
            ProviderRepository::new("acme", "vault", "https://example.com/acme/vault.git", true)
                .with_archived(true),
        ];

        let manifest = CloneManifest::new(ProviderType::Github, "acme", CloneStrategy::Pull, &repos);

        assert_eq!(manifest.organization, "acme");
        assert_eq!(manifest.repositories.len(), 2);
        assert_eq!(manifest.repositories[0].default_branch.as_deref(), Some("trunk"));
        assert!(manifest.repositories[1].is_archived);
        assert!(manifest.contains("vault"));
        assert!(!manifest.contains("web"));

        let yaml = serde_yaml::to_string(&manifest).unwrap();
        assert!(yaml.contains("provider: github"));
        assert!(yaml.contains("strategy: pull"));
    }
}
