//! CLI command implementations.

pub mod operations;
pub mod run;
