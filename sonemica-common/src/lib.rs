//! # Sonemica Common Library
//!
//! Shared code for the Sonemica analysis binaries:
//! - Error and result types
//! - TOML bootstrap configuration and config file resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
