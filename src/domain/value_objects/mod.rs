//! Small immutable values shared by the domain

#![allow(missing_docs)]

pub mod clone_strategy;
pub mod name_pattern;
pub mod provider_type;
pub mod visibility;
