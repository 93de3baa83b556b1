//! Configuration file storage

#![allow(missing_docs)]

pub mod config_store;
