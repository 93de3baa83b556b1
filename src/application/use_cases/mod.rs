//! Use cases driving providers from configuration

#![allow(missing_docs)]

pub mod bulk_operations;
pub mod list_repositories;

pub use bulk_operations::{BulkCloneUseCase, BulkOperationConfig, BulkRefreshUseCase};
pub use list_repositories::{ListRepositoriesResult, ListRepositoriesUseCase};
