use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Git hosting provider kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// github.com or GitHub Enterprise
    Github,
    /// gitlab.com or a self-managed GitLab
    Gitlab,
    /// Self-hosted Gitea
    Gitea,
}

impl Default for ProviderType {
    fn default() -> Self {
        Self::Github
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderType {
    type Err = ProviderTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "github" => Ok(ProviderType::Github),
            "gitlab" => Ok(ProviderType::Gitlab),
            "gitea" => Ok(ProviderType::Gitea),
            _ => Err(ProviderTypeError::UnsupportedProvider(s.to_string())),
        }
    }
}

impl ProviderType {
    /// Every supported provider, in display order
    pub const ALL: [ProviderType; 3] = [
        ProviderType::Github,
        ProviderType::Gitlab,
        ProviderType::Gitea,
    ];

    /// Lowercase name used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Github => "github",
            ProviderType::Gitlab => "gitlab",
            ProviderType::Gitea => "gitea",
        }
    }

    /// API root used when the configuration does not set one.
    ///
    /// Gitea has no public SaaS instance, so it always needs an explicit URL.
    pub fn default_api_url(&self) -> Option<&'static str> {
        match self {
            ProviderType::Github => Some("https://api.github.com"),
            ProviderType::Gitlab => Some("https://gitlab.com"),
            ProviderType::Gitea => None,
        }
    }

    /// Environment variable conventionally holding a token for this provider
    pub fn token_env_var(&self) -> &'static str {
        match self {
            ProviderType::Github => "GITHUB_TOKEN",
            ProviderType::Gitlab => "GITLAB_TOKEN",
            ProviderType::Gitea => "GITEA_TOKEN",
        }
    }

    /// User name paired with the token in authenticated HTTPS clone URLs
    pub fn clone_username(&self) -> Option<&'static str> {
        match self {
            ProviderType::Github => Some("x-access-token"),
            ProviderType::Gitlab => Some("oauth2"),
            ProviderType::Gitea => None,
        }
    }
}

/// Errors that can occur when parsing a provider name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderTypeError {
    /// The name does not match any supported provider
    UnsupportedProvider(String),
}

impl fmt::Display for ProviderTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderTypeError::UnsupportedProvider(name) => write!(
                f,
                "Unsupported provider: '{}'. Supported providers are: github, gitlab, gitea",
                name
            ),
        }
    }
}

impl std::error::Error for ProviderTypeError {}
