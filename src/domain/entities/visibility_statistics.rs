use serde::{Deserialize, Serialize};

use crate::domain::entities::repository::VisibilityRepository;

/// Public/private counts over a repository list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityStatistics {
    /// Number of repositories counted
    pub total_repositories: usize,
    /// Repositories reported as public
    pub public_repositories: usize,
    /// Repositories reported as private
    pub private_repositories: usize,
}

impl VisibilityStatistics {
    /// Count `repos` in a single pass
    pub fn calculate(repos: &[VisibilityRepository]) -> Self {
        repos.iter().fold(Self::default(), |mut stats, repo| {
            stats.total_repositories += 1;
            if repo.is_private {
                stats.private_repositories += 1;
            } else {
                stats.public_repositories += 1;
            }
            stats
        })
    }

    /// `(public %, private %)`, both zero for an empty list
    pub fn visibility_percentage(&self) -> (f64, f64) {
        if self.total_repositories == 0 {
            return (0.0, 0.0);
        }

        let total = self.total_repositories as f64;
        (
            self.public_repositories as f64 / total * 100.0,
            self.private_repositories as f64 / total * 100.0,
        )
    }

    pub fn summary(&self) -> String {
        if self.total_repositories == 0 {
            return "No repositories found".to_string();
        }

        let (public_pct, private_pct) = self.visibility_percentage();
        format!(
            "Total: {} repositories ({:.1}% public, {:.1}% private)",
            self.total_repositories, public_pct, private_pct
        )
    }
}
