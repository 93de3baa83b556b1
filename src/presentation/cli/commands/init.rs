use anyhow::Result;
use std::path::PathBuf;

use crate::common::result::SyncloneResult;
use crate::domain::entities::synclone_config::{
    ConfigBuilder, OrganizationConfig, ProviderConfigBuilder, SyncloneConfig,
};
use crate::domain::value_objects::clone_strategy::CloneStrategy;
use crate::domain::value_objects::visibility::Visibility;
use crate::infrastructure::filesystem::config_store::{default_config_path, ConfigStore};

/// Write a sample synclone.yaml
pub struct InitCommand {
    /// Target file, defaults to `~/.config/synclone/synclone.yaml`
    pub path: Option<PathBuf>,
    /// Force overwrite existing file
    pub force: bool,
}

/// Sample configuration written by `synclone init`
pub fn sample_config() -> SyncloneResult<SyncloneConfig> {
    let config = ConfigBuilder::new()
        .with_default_provider("github")
        .with_clone_base_dir("~/repos")
        .with_global_ignores(vec!["*-archive".to_string()])
        .with_provider(
            "github",
            ProviderConfigBuilder::new()
                .with_token("${GITHUB_TOKEN}")
                .with_organization(
                    OrganizationConfig::new("my-org")
                        .with_visibility(Visibility::All)
                        .with_strategy(CloneStrategy::Reset),
                )
                .build(),
        )
        .with_provider(
            "gitlab",
            ProviderConfigBuilder::new()
                .with_token("${GITLAB_TOKEN}")
                .with_organization(
                    OrganizationConfig::new("my-group")
                        .with_visibility(Visibility::Private)
                        .with_include("^backend-")
                        .with_exclude(vec!["*-deprecated".to_string()]),
                )
                .build(),
        )
        .build()?;
    Ok(config)
}

impl InitCommand {
    pub fn new(path: Option<PathBuf>, force: bool) -> Self {
        Self { path, force }
    }

    pub async fn execute(&self) -> Result<()> {
        let target_file = match &self.path {
            Some(path) => path.clone(),
            None => default_config_path()?,
        };

        if target_file.exists() && !self.force {
            return Err(anyhow::anyhow!(
                "File {} already exists. Use --force to overwrite.",
                target_file.display()
            ));
        }

        let config = sample_config()?;
        ConfigStore::new().save(&target_file, &config).await?;

        println!("✅ Created {}", target_file.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Replace my-org / my-group with your organizations");
        println!("   2. Export GITHUB_TOKEN / GITLAB_TOKEN");
        println!("   3. Run 'synclone clone --dry-run' to check access");

        Ok(())
    }
}
