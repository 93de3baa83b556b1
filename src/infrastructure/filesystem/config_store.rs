use std::path::{Path, PathBuf};
use tokio::fs as async_fs;

use crate::common::error::SyncloneError;
use crate::common::result::{OptionExt, ResultExt, SyncloneResult};
use crate::domain::entities::synclone_config::SyncloneConfig;

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "SYNCLONE_CONFIG";

/// File names looked up in the working directory
pub const LOCAL_CONFIG_FILES: [&str; 2] = ["synclone.yaml", "synclone.yml"];

/// Loads and saves `synclone.yaml`
#[derive(Debug, Clone)]
pub struct ConfigStore {
    search_paths: Vec<PathBuf>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self {
            search_paths: Self::default_search_paths(),
        }
    }
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search only the given locations
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    /// `$SYNCLONE_CONFIG`, then the working directory, then `~/.config/synclone/`
    pub fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(explicit) = std::env::var(CONFIG_ENV_VAR) {
            if !explicit.is_empty() {
                paths.push(PathBuf::from(expand_home(&explicit)));
            }
        }

        paths.extend(LOCAL_CONFIG_FILES.iter().map(PathBuf::from));

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("synclone").join("synclone.yaml"));
        }

        paths
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Resolve the configuration file to use
    pub fn locate(&self, explicit: Option<&Path>) -> SyncloneResult<PathBuf> {
        if let Some(path) = explicit {
            if path.is_file() {
                return Ok(path.to_path_buf());
            }
            return Err(SyncloneError::config_store_error(
                format!("Configuration file not found: {}", path.display()),
                Some(path.to_path_buf()),
            ));
        }

        self.search_paths
            .iter()
            .find(|path| path.is_file())
            .cloned()
            .ok_or_else(|| {
                let searched: Vec<String> = self
                    .search_paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect();
                SyncloneError::config_store_error(
                    format!("No configuration file found (searched: {})", searched.join(", ")),
                    None,
                )
            })
    }

    /// Locate, read, expand and validate the configuration
    pub async fn load(&self, explicit: Option<&Path>) -> SyncloneResult<(PathBuf, SyncloneConfig)> {
        let path = self.locate(explicit)?;
        let config = self.load_from(&path).await?;
        Ok((path, config))
    }

    pub async fn load_from(&self, path: &Path) -> SyncloneResult<SyncloneConfig> {
        tracing::debug!("Loading configuration from {}", path.display());

        let content = async_fs::read_to_string(path)
            .await
            .with_filesystem_error("Failed to read configuration", Some(path.to_path_buf()))?;

        parse_config(&content).map_err(|e| match e {
            SyncloneError::SerializationError { message, source } => {
                SyncloneError::config_store_error(
                    format!(
                        "{}: {}",
                        message,
                        source.map(|s| s.to_string()).unwrap_or_default()
                    ),
                    Some(path.to_path_buf()),
                )
            }
            other => other,
        })
    }

    /// Validate and write `config` as YAML, creating parent directories
    pub async fn save(&self, path: &Path, config: &SyncloneConfig) -> SyncloneResult<()> {
        config.validate_config()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            async_fs::create_dir_all(parent)
                .await
                .with_filesystem_error("Failed to create directory", Some(parent.to_path_buf()))?;
        }

        let yaml = serde_yaml::to_string(config)?;
        async_fs::write(path, yaml)
            .await
            .with_filesystem_error("Failed to write configuration", Some(path.to_path_buf()))?;

        tracing::info!("Configuration written to {}", path.display());
        Ok(())
    }
}

/// Parse YAML, expand tokens and directories, then validate
pub fn parse_config(content: &str) -> SyncloneResult<SyncloneConfig> {
    let mut config: SyncloneConfig = serde_yaml::from_str(content)?;
    expand_config(&mut config, |name| std::env::var(name).ok());
    config.validate_config()?;
    Ok(config)
}

/// Expand `${VAR}`/`$VAR` in tokens and `~` in directories
pub fn expand_config<F>(config: &mut SyncloneConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    config.global.clone_base_dir = expand_home(&config.global.clone_base_dir);

    for (name, provider) in config.providers.iter_mut() {
        if let Some(token) = provider.token.take() {
            let expanded = expand_env_with(&token, &lookup);
            if expanded.is_empty() {
                tracing::warn!("Token for provider {} expands to an empty value", name);
                provider.token = None;
            } else {
                provider.token = Some(expanded);
            }
        }

        for org in provider.organizations.iter_mut() {
            if let Some(dir) = org.clone_dir.take() {
                org.clone_dir = Some(expand_home(&dir));
            }
        }
    }
}

/// Replace a leading `~` with the home directory
pub fn expand_home(path: &str) -> String {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return path.to_string(),
    };

    match dirs::home_dir() {
        Some(home) => format!("{}{}", home.display(), rest),
        None => path.to_string(),
    }
}

fn is_var_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Substitute `${VAR}` and `$VAR` using `lookup`; unknown variables become empty
pub fn expand_env_with<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                out.push_str(&lookup(&braced[..end]).unwrap_or_default());
                rest = &braced[end + 1..];
                continue;
            }
        } else {
            let len = after.find(|c: char| !is_var_char(c)).unwrap_or(after.len());
            if len > 0 {
                out.push_str(&lookup(&after[..len]).unwrap_or_default());
                rest = &after[len..];
                continue;
            }
        }

        out.push('$');
        rest = after;
    }

    out.push_str(rest);
    out
}

/// Default location for a newly generated configuration
pub fn default_config_path() -> SyncloneResult<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".config").join("synclone").join("synclone.yaml"))
        .ok_or_validation_error("home", "home directory could not be determined")
}
