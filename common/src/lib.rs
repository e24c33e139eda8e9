//! Shared utilities for the database setup tooling
//!
//! This crate provides common functionality used by the setup binaries:
//! - Structured logging initialization
//! - Environment variable parsing helpers

pub mod config;
pub mod logging;

pub use config::{non_empty, ConfigExt};
pub use logging::init_logging;
