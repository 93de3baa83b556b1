use serde::{Deserialize, Serialize};

/// Minimal repository view consumed by the filter engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisibilityRepository {
    /// Short repository name, without the owner
    pub name: String,
    /// Whether the hosting provider reports the repository as private
    pub is_private: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_fork: bool,
}

impl VisibilityRepository {
    /// Create a new repository view, neither archived nor a fork
    pub fn new(name: impl Into<String>, is_private: bool) -> Self {
        Self {
            name: name.into(),
            is_private,
            is_archived: false,
            is_fork: false,
        }
    }

    pub fn with_archived(mut self, is_archived: bool) -> Self {
        self.is_archived = is_archived;
        self
    }

    pub fn with_fork(mut self, is_fork: bool) -> Self {
        self.is_fork = is_fork;
        self
    }
}

/// Repository record normalized across hosting providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRepository {
    /// Short repository name
    pub name: String,
    /// `owner/name` as reported by the provider
    pub full_name: String,
    /// Organization, group or user owning the repository
    pub owner: String,
    /// HTTPS clone URL
    pub clone_url: String,
    /// SSH clone URL, when the provider exposes one
    pub ssh_url: Option<String>,
    /// Default branch, when known
    pub default_branch: Option<String>,
    /// Private or internal repositories
    pub is_private: bool,
    /// Archived repositories are read-only on the provider
    pub is_archived: bool,
    /// Whether the repository is a fork
    pub is_fork: bool,
    /// Free text description
    pub description: Option<String>,
}

impl ProviderRepository {
    /// Create a record with the required fields; the rest default to empty
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        clone_url: impl Into<String>,
        is_private: bool,
    ) -> Self {
        let owner = owner.into();
        let name = name.into();
        Self {
            full_name: format!("{}/{}", owner, name),
            name,
            owner,
            clone_url: clone_url.into(),
            ssh_url: None,
            default_branch: None,
            is_private,
            is_archived: false,
            is_fork: false,
            description: None,
        }
    }

    /// Set the default branch
    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = Some(branch.into());
        self
    }

    /// Set the SSH clone URL
    pub fn with_ssh_url(mut self, ssh_url: impl Into<String>) -> Self {
        self.ssh_url = Some(ssh_url.into());
        self
    }

    /// Mark the repository as archived
    pub fn with_archived(mut self, is_archived: bool) -> Self {
        self.is_archived = is_archived;
        self
    }

    /// Mark the repository as a fork
    pub fn with_fork(mut self, is_fork: bool) -> Self {
        self.is_fork = is_fork;
        self
    }

    /// View used by the filter engine
    pub fn to_visibility_repository(&self) -> VisibilityRepository {
        VisibilityRepository::new(self.name.clone(), self.is_private)
            .with_archived(self.is_archived)
            .with_fork(self.is_fork)
    }
}

impl From<&ProviderRepository> for VisibilityRepository {
    fn from(repo: &ProviderRepository) -> Self {
        repo.to_visibility_repository()
    }
}
