//! Infrastructure layer
//!
//! Concrete implementations for external systems:
//! - hosting provider REST APIs (GitHub, GitLab, Gitea)
//! - git working copy operations through the `git` executable
//! - configuration file storage

#![allow(missing_docs)]

pub mod filesystem;
pub mod git;
pub mod provider;

pub use filesystem::config_store::ConfigStore;
pub use git::GitCommandRunner;
pub use provider::ProviderFactory;
