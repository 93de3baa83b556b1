//! Git working copy operations through the `git` executable

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::domain::value_objects::clone_strategy::CloneStrategy;

/// Errors from running git
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("Git command failed: {command}, exit code: {exit_code}, stderr: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Not a git repository: {path}")]
    NotARepository { path: String },

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    #[error("Git I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Runs git subcommands against local working copies
#[derive(Debug, Clone)]
pub struct GitCommandRunner {
    git_executable: String,
}

impl Default for GitCommandRunner {
    fn default() -> Self {
        Self {
            git_executable: "git".to_string(),
        }
    }
}

impl GitCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific git binary
    pub fn with_executable(executable: impl Into<String>) -> Self {
        Self {
            git_executable: executable.into(),
        }
    }

    /// Whether `path` holds a git working copy
    pub fn is_repository(&self, path: &Path) -> bool {
        path.join(".git").exists()
    }

    async fn run(&self, args: &[&str], working_dir: Option<&Path>) -> Result<String, GitError> {
        let mut cmd = Command::new(&self.git_executable);
        cmd.args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true);

        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: format!("{} {}", self.git_executable, redact_args(args)),
                exit_code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Clone `url` into `dest`.
    ///
    /// When `dest` did not exist beforehand it is removed again if the clone fails
    /// or the returned future is dropped before completion.
    pub async fn clone(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        let dest_str = dest.to_str().ok_or_else(|| GitError::InvalidPath {
            path: dest.display().to_string(),
        })?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut guard = PartialClone::new(dest);
        self.run(&["clone", url, dest_str], None).await?;
        guard.keep();

        Ok(())
    }

    /// Bring an existing working copy up to date with `strategy`
    pub async fn update(&self, repo_path: &Path, strategy: CloneStrategy) -> Result<(), GitError> {
        if !self.is_repository(repo_path) {
            return Err(GitError::NotARepository {
                path: repo_path.display().to_string(),
            });
        }

        match strategy {
            CloneStrategy::Reset => {
                self.run(&["reset", "--hard", "HEAD"], Some(repo_path)).await?;
                self.run(&["pull"], Some(repo_path)).await?;
            }
            CloneStrategy::Pull => {
                self.run(&["pull"], Some(repo_path)).await?;
            }
            CloneStrategy::Fetch => {
                self.run(&["fetch", "--all", "--prune"], Some(repo_path)).await?;
            }
        }

        Ok(())
    }

    /// Clone when `dest` is absent, otherwise update it
    pub async fn clone_or_update(
        &self,
        url: &str,
        dest: &Path,
        strategy: CloneStrategy,
    ) -> Result<(), GitError> {
        if self.is_repository(dest) {
            tracing::debug!("Updating {} with strategy {}", dest.display(), strategy);
            self.update(dest, strategy).await
        } else {
            tracing::debug!("Cloning into {}", dest.display());
            self.clone(url, dest).await
        }
    }
}

/// Removes a clone destination created by an unfinished clone
struct PartialClone {
    dest: Option<PathBuf>,
}

impl PartialClone {
    fn new(dest: &Path) -> Self {
        Self {
            dest: (!dest.exists()).then(|| dest.to_path_buf()),
        }
    }

    fn keep(&mut self) {
        self.dest = None;
    }
}

impl Drop for PartialClone {
    fn drop(&mut self) {
        let Some(dest) = self.dest.take() else {
            return;
        };
        if !dest.exists() {
            return;
        }
        match std::fs::remove_dir_all(&dest) {
            Ok(()) => tracing::debug!("Removed partial clone at {}", dest.display()),
            Err(e) => tracing::warn!("Failed to remove partial clone at {}: {}", dest.display(), e),
        }
    }
}

/// Strip credentials from URLs before they end up in error messages
fn redact_args(args: &[&str]) -> String {
    args.iter()
        .map(|arg| match url::Url::parse(arg) {
            Ok(mut parsed) if parsed.password().is_some() || !parsed.username().is_empty() => {
                let _ = parsed.set_username("");
                let _ = parsed.set_password(None);
                parsed.to_string()
            }
            _ => arg.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
