//! Clone and refresh logic shared by every provider adapter

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use url::Url;
use walkdir::WalkDir;

use super::provider_interface::{CloneOptions, ProviderError};
use crate::domain::entities::clone_manifest::{CloneManifest, MANIFEST_FILE_NAME};
use crate::domain::entities::repository::ProviderRepository;
use crate::domain::entities::repository_filter::RepositoryFilter;
use crate::domain::value_objects::clone_strategy::CloneStrategy;
use crate::domain::value_objects::provider_type::ProviderType;
use crate::infrastructure::git::GitCommandRunner;

/// Embed `token` into an HTTPS clone URL. Other URLs are returned unchanged.
pub fn authenticated_clone_url(
    clone_url: &str,
    provider: ProviderType,
    token: Option<&str>,
) -> String {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return clone_url.to_string();
    };

    let Ok(mut url) = Url::parse(clone_url) else {
        return clone_url.to_string();
    };

    if url.scheme() != "https" {
        return clone_url.to_string();
    }

    let applied = match provider.clone_username() {
        Some(user) => url.set_username(user).and_then(|_| url.set_password(Some(token))),
        None => url.set_username(token),
    };

    match applied {
        Ok(()) => url.to_string(),
        Err(()) => clone_url.to_string(),
    }
}

fn failures_to_error(failures: Vec<String>, total: usize) -> Result<(), ProviderError> {
    if failures.is_empty() {
        return Ok(());
    }

    Err(ProviderError::RepositoryFailures {
        failed: failures.len(),
        total,
        details: failures.join("; "),
    })
}

/// Where a clone's repositories come from
#[derive(Debug, Clone, Copy)]
pub struct CloneSource<'a> {
    pub provider: ProviderType,
    pub owner: &'a str,
    pub token: Option<&'a str>,
}

/// Git working copies directly under `dir`, skipping hidden entries, sorted by name
fn working_copies(git: &GitCommandRunner, dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .filter(|entry| entry.file_type().is_dir() && git.is_repository(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Delete working copies under `target` whose name is not in `keep`.
/// Returns the removed names; removal failures are appended to `failures`.
pub async fn remove_orphans(
    git: &GitCommandRunner,
    target: &Path,
    keep: &HashSet<&str>,
    failures: &mut Vec<String>,
) -> Vec<String> {
    let mut removed = Vec::new();

    for path in working_copies(git, target) {
        let name = dir_name(&path);
        if keep.contains(name.as_str()) {
            continue;
        }

        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => {
                tracing::info!("Removed orphan working copy {}", path.display());
                removed.push(name);
            }
            Err(e) => {
                tracing::warn!("Cannot remove orphan {}: {}", path.display(), e);
                failures.push(format!("{}: cannot remove orphan: {}", name, e));
            }
        }
    }

    removed
}

async fn write_manifest(target: &Path, manifest: &CloneManifest) {
    let path = target.join(MANIFEST_FILE_NAME);
    let written = match serde_yaml::to_string(manifest) {
        Ok(yaml) => tokio::fs::write(&path, yaml).await.map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    if let Err(e) = written {
        tracing::warn!("Cannot write {}: {}", path.display(), e);
    }
}

/// Clone or update every repository in `repos` accepted by `filter` into `target/<name>`.
///
/// The selection is recorded in `target/.synclone.yaml` before any git work starts.
pub async fn clone_filtered(
    git: &GitCommandRunner,
    source: &CloneSource<'_>,
    repos: &[ProviderRepository],
    target: &Path,
    options: &CloneOptions,
    filter: &RepositoryFilter,
) -> Result<(), ProviderError> {
    tokio::fs::create_dir_all(target).await.map_err(|e| {
        ProviderError::config(format!("Cannot create {}: {}", target.display(), e))
    })?;

    let selected: Vec<&ProviderRepository> = repos
        .iter()
        .filter(|repo| filter.should_include_repository(&repo.to_visibility_repository()))
        .collect();

    tracing::info!(
        "{}/{}: {} of {} repositories selected ({})",
        source.provider,
        source.owner,
        selected.len(),
        repos.len(),
        filter.filter_summary()
    );

    let manifest = CloneManifest::new(
        source.provider,
        source.owner,
        options.strategy,
        selected.iter().copied(),
    );
    write_manifest(target, &manifest).await;

    let mut failures = Vec::new();

    if options.cleanup_orphans {
        let keep: HashSet<&str> = selected.iter().map(|repo| repo.name.as_str()).collect();
        let removed = remove_orphans(git, target, &keep, &mut failures).await;
        if !removed.is_empty() {
            tracing::info!(
                "{}/{}: removed {} orphan working copies",
                source.provider,
                source.owner,
                removed.len()
            );
        }
    }

    for repo in &selected {
        let dest = target.join(&repo.name);
        let url = authenticated_clone_url(&repo.clone_url, source.provider, source.token);

        if let Err(e) = git.clone_or_update(&url, &dest, options.strategy).await {
            tracing::warn!("{}: {}", repo.full_name, e);
            failures.push(format!("{}: {}", repo.name, e));
        }
    }

    failures_to_error(failures, selected.len())
}

/// Update every git working copy found directly under `target`
pub async fn refresh_existing(
    git: &GitCommandRunner,
    target: &Path,
    strategy: CloneStrategy,
) -> Result<(), ProviderError> {
    if !target.is_dir() {
        return Err(ProviderError::not_found(format!(
            "clone directory {}",
            target.display()
        )));
    }

    let copies = working_copies(git, target);

    tracing::info!(
        "Refreshing {} working copies under {} with strategy {}",
        copies.len(),
        target.display(),
        strategy
    );

    let mut failures = Vec::new();
    for path in &copies {
        if let Err(e) = git.update(path, strategy).await {
            tracing::warn!("{}: {}", path.display(), e);
            failures.push(format!("{}: {}", dir_name(path), e));
        }
    }

    failures_to_error(failures, copies.len())
}
