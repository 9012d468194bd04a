//! Subcommand implementations.

pub mod export;
pub mod import;
pub mod info;
pub mod query;
