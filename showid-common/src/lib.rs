//! # showid Common Library
//!
//! Shared code for the showid ingestion crates:
//! - Error type and result alias
//! - TOML configuration loading and path resolution
//! - Tracing subscriber bootstrap

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
