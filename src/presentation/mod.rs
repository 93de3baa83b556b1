//! Presentation layer

#![allow(missing_docs)]

pub mod cli;
