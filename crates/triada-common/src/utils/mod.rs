//! Common utilities used throughout Triada.
//!
//! - [`error`] - The crate-wide [`Error`] and [`Result`] types

pub mod error;

pub use error::{Error, Result};
