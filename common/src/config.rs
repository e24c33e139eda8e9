//! Environment variable parsing helpers
//!
//! Provides ergonomic helpers for reading configuration from environment variables.

use std::env;

/// Extension trait for reading environment variables.
pub trait ConfigExt {
    /// Get an environment variable, treating unset, empty and
    /// whitespace-only values alike as absent.
    ///
    /// # Example
    /// ```ignore
    /// let path = String::env_non_empty("SCHEMA_SQL_PATH").unwrap_or_default();
    /// ```
    fn env_non_empty(name: &str) -> Option<String> {
        non_empty(env::var(name).ok())
    }
}

// Blanket implementation for all types
impl<T> ConfigExt for T {}

/// Drop values that are empty once surrounding whitespace is removed.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
