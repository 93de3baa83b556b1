//! Git hosting provider adapters

#![allow(missing_docs)]

pub mod gitea;
pub mod github;
pub mod gitlab;
pub mod http;
pub mod provider_factory;
pub mod provider_interface;
pub mod sync;

pub use provider_factory::ProviderFactory;
pub use provider_interface::{
    CloneOptions, GitProvider, ProviderClientFactory, ProviderCloner, ProviderError,
    ProviderService,
};
