//! SQL script loading

use anyhow::{Context, Result};
use common::{non_empty, ConfigExt};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_SCHEMA_SQL: &str = "scripts/001_reset_and_create_enhanced_schema.sql";
pub const DEFAULT_SEED_SQL: &str = "scripts/002_seed_sample_data.sql";

pub const SCHEMA_SQL_PATH: &str = "SCHEMA_SQL_PATH";
pub const SEED_SQL_PATH: &str = "SEED_SQL_PATH";

/// Where the schema and seed scripts live, relative to the working directory
/// unless absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPaths {
    pub schema: PathBuf,
    pub seed: PathBuf,
}

impl Default for ScriptPaths {
    fn default() -> Self {
        Self {
            schema: PathBuf::from(DEFAULT_SCHEMA_SQL),
            seed: PathBuf::from(DEFAULT_SEED_SQL),
        }
    }
}

impl ScriptPaths {
    /// Default locations, overridable with `SCHEMA_SQL_PATH` and `SEED_SQL_PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(String::env_non_empty)
    }

    /// Resolve paths through `lookup`; unset or blank overrides keep the
    /// default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = |name: &str, default: &str| {
            PathBuf::from(non_empty(lookup(name)).unwrap_or_else(|| default.to_string()))
        };

        Self {
            schema: path(SCHEMA_SQL_PATH, DEFAULT_SCHEMA_SQL),
            seed: path(SEED_SQL_PATH, DEFAULT_SEED_SQL),
        }
    }
}

/// Schema and seed SQL held in memory until they are sent.
#[derive(Debug, Clone)]
pub struct SqlScripts {
    pub paths: ScriptPaths,
    pub schema: String,
    pub seed: String,
}

impl SqlScripts {
    /// Read both scripts. A missing or unreadable file aborts the run.
    pub fn load(paths: &ScriptPaths) -> Result<Self> {
        let schema = read_script(&paths.schema, "schema")?;
        let seed = read_script(&paths.seed, "seed")?;

        Ok(Self {
            paths: paths.clone(),
            schema,
            seed,
        })
    }
}

fn read_script(path: &Path, kind: &str) -> Result<String> {
    let sql = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} script {}", kind, path.display()))?;
    debug!(path = %path.display(), bytes = sql.len(), "Loaded {} script", kind);
    Ok(sql)
}
