//! Configuration and repository fixtures

use std::path::Path;

use synclone::domain::entities::repository::ProviderRepository;
use synclone::domain::entities::synclone_config::{
    ConfigBuilder, OrganizationConfig, ProviderConfigBuilder, SyncloneConfig,
};

pub fn repo(owner: &str, name: &str, is_private: bool) -> ProviderRepository {
    ProviderRepository::new(
        owner,
        name,
        format!("https://example.com/{}/{}.git", owner, name),
        is_private,
    )
}

/// github: acme, widgets; gitlab: platform; all cloned under `base`
pub fn two_provider_config(base: &Path) -> SyncloneConfig {
    ConfigBuilder::new()
        .with_clone_base_dir(base.display().to_string())
        .with_provider(
            "github",
            ProviderConfigBuilder::new()
                .with_token("ghp_test")
                .with_organization(OrganizationConfig::new("acme"))
                .with_organization(OrganizationConfig::new("widgets"))
                .build(),
        )
        .with_provider(
            "gitlab",
            ProviderConfigBuilder::new()
                .with_organization(OrganizationConfig::new("platform"))
                .build(),
        )
        .build()
        .expect("fixture config is valid")
}

/// github: acme, widgets; gitlab: platform, infra; all cloned under `base`
pub fn two_by_two_config(base: &Path) -> SyncloneConfig {
    ConfigBuilder::new()
        .with_clone_base_dir(base.display().to_string())
        .with_provider(
            "github",
            ProviderConfigBuilder::new()
                .with_organization(OrganizationConfig::new("acme"))
                .with_organization(OrganizationConfig::new("widgets"))
                .build(),
        )
        .with_provider(
            "gitlab",
            ProviderConfigBuilder::new()
                .with_organization(OrganizationConfig::new("platform"))
                .with_organization(OrganizationConfig::new("infra"))
                .build(),
        )
        .build()
        .expect("fixture config is valid")
}

pub const SAMPLE_YAML: &str = r#"
version: "1.0.0"
defaultProvider: github
global:
  clone_base_dir: /tmp/synclone-fixture
  global_ignores: ["*-archive"]
providers:
  github:
    token: plain-token
    organizations:
      - name: acme
        visibility: private
        include: "^api-"
"#;
