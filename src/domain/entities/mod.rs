//! Domain entities: repositories, filters, statistics, bulk results, clone manifests and configuration

#![allow(missing_docs)]

pub mod bulk_result;
pub mod clone_manifest;
pub mod repository;
pub mod repository_filter;
pub mod synclone_config;
pub mod visibility_statistics;
