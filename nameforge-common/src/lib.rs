//! # nameforge common library
//!
//! Shared code for the nameforge crates:
//! - Error and result types
//! - TOML configuration model, path resolution and atomic writes
//! - Tracing initialisation

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
