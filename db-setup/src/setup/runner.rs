//! The setup sequence
//!
//! Schema, seed and verification are attempted in that order. A failed
//! remote step is reported and the next one still runs; only local problems
//! (unreadable scripts, a closed output stream) end the run early.

use super::scripts::{ScriptPaths, SqlScripts};
use super::verification::{verify, Verification};
use crate::client::DatabaseService;
use crate::error::ServiceError;
use crate::report::Console;
use anyhow::{Context, Result};
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Outcome of each remote step.
#[derive(Debug)]
pub struct SetupReport {
    pub schema: Result<(), ServiceError>,
    pub seed: Result<(), ServiceError>,
    pub verification: Result<Verification, ServiceError>,
    pub elapsed: Duration,
}

impl SetupReport {
    pub fn all_succeeded(&self) -> bool {
        self.schema.is_ok() && self.seed.is_ok() && self.verification.is_ok()
    }
}

/// Apply the schema script.
pub fn apply_schema<S: DatabaseService + ?Sized>(
    service: &S,
    scripts: &SqlScripts,
) -> Result<(), ServiceError> {
    info!(path = %scripts.paths.schema.display(), "Applying schema");
    service.execute_sql(&scripts.schema)
}

/// Apply the seed script.
pub fn apply_seed<S: DatabaseService + ?Sized>(
    service: &S,
    scripts: &SqlScripts,
) -> Result<(), ServiceError> {
    info!(path = %scripts.paths.seed.display(), "Seeding sample data");
    service.execute_sql(&scripts.seed)
}

/// Run the three remote steps against already loaded scripts.
pub fn run_setup<S, W>(
    service: &S,
    scripts: &SqlScripts,
    console: &mut Console<W>,
) -> Result<SetupReport>
where
    S: DatabaseService + ?Sized,
    W: Write,
{
    let start = Instant::now();

    console.step(1, "Creating Enhanced Database Schema")?;
    let schema = apply_schema(service, scripts);
    match &schema {
        Ok(()) => console.schema_applied()?,
        Err(e) => {
            error!(error = %e, "Schema creation failed");
            console.schema_failed(e, &scripts.paths)?;
        }
    }

    console.step(2, "Seeding Sample Price Data")?;
    let seed = apply_seed(service, scripts);
    match &seed {
        Ok(()) => console.seed_applied()?,
        Err(e) => {
            error!(error = %e, "Seeding failed");
            console.seed_failed(e)?;
        }
    }

    console.step(3, "Verifying Database Setup")?;
    let verification = verify(service);
    match &verification {
        Ok(v) => {
            info!(count = v.count, symbols = v.symbols.len(), "Verification passed");
            console.verified(v)?;
        }
        Err(e) => {
            warn!(error = %e, "Verification failed");
            console.verification_failed(e)?;
        }
    }

    Ok(SetupReport {
        schema,
        seed,
        verification,
        elapsed: start.elapsed(),
    })
}

/// Load the scripts, run every step and print the closing summary.
///
/// Returns an error only for local failures; remote failures are carried in
/// the report.
pub fn provision<S, W>(service: &S, paths: &ScriptPaths, out: W) -> Result<SetupReport>
where
    S: DatabaseService + ?Sized,
    W: Write,
{
    let mut console = Console::new(out);
    console.banner()?;

    console.reading_scripts()?;
    let scripts = SqlScripts::load(paths)?;
    console.scripts_loaded()?;

    let report = run_setup(service, &scripts, &mut console)?;

    console.complete().context("Failed to write setup summary")?;

    info!(
        ok = report.all_succeeded(),
        schema_ok = report.schema.is_ok(),
        seed_ok = report.seed.is_ok(),
        verified = report.verification.is_ok(),
        duration_ms = report.elapsed.as_millis() as u64,
        "Database setup finished"
    );

    Ok(report)
}
