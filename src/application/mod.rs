//! Application layer

pub mod use_cases;
