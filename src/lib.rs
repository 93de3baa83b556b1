//! # synclone
//!
//! `synclone` clones and refreshes every repository of the organizations, groups
//! and users you configure on GitHub, GitLab and Gitea.
//!
//! ## Quick Start
//!
//! 1. Write `synclone.yaml` (or run `synclone init`):
//!
//! ```yaml
//! version: "1.0.0"
//! defaultProvider: github
//! global:
//!   clone_base_dir: ~/repos
//!   global_ignores: ["*-archive"]
//! providers:
//!   github:
//!     token: ${GITHUB_TOKEN}
//!     organizations:
//!       - name: my-org
//!         visibility: private
//!         include: "^api-"
//! ```
//!
//! 2. Clone, then keep the clones current:
//!
//! ```bash
//! synclone clone
//! synclone refresh --strategy fetch
//! ```
//!
//! ## Architecture
//!
//! - [`domain`]: filters, statistics, bulk results and configuration
//! - [`application`]: bulk clone/refresh and listing use cases
//! - [`infrastructure`]: provider REST adapters, git runner, config storage
//! - [`presentation`]: command-line interface
//! - [`common`]: crate-wide error type and result helpers
//!
//! ## Filtering
//!
//! A [`domain::entities::repository_filter::RepositoryFilter`] keeps a repository
//! when its visibility is accepted, its name matches the include pattern and no
//! exclude pattern matches. Patterns are tried as a regex, then as a glob, then
//! as a plain substring.
//!
//! ```rust
//! use synclone::domain::entities::repository::VisibilityRepository;
//! use synclone::domain::entities::repository_filter::RepositoryFilter;
//!
//! let filter = RepositoryFilter::new("public", Some("^api-"), vec!["*-test".into()]).unwrap();
//! assert!(filter.should_include_repository(&VisibilityRepository::new("api-server", false)));
//! assert!(!filter.should_include_repository(&VisibilityRepository::new("api-test", false)));
//! ```
//!
//! ## Bulk operations
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use synclone::application::use_cases::{BulkCloneUseCase, BulkOperationConfig};
//! use synclone::infrastructure::{ConfigStore, ProviderFactory};
//!
//! # async fn example() -> synclone::Result<()> {
//! let (_, config) = ConfigStore::new().load(None).await?;
//! let use_case = BulkCloneUseCase::new(Arc::new(ProviderFactory::new()), config);
//! let result = use_case.execute(&BulkOperationConfig::default().with_dry_run(true)).await?;
//! println!("{}", result.summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use crate::common::error::SyncloneError;
pub use crate::common::result::SyncloneResult as Result;
