//! # callscan common library
//!
//! Shared code for the callscan tools:
//! - Error type used at configuration and startup boundaries
//! - TOML configuration file discovery and loading

pub mod config;
pub mod error;

pub use error::{Error, Result};
