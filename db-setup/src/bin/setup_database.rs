//! Database setup script
//!
//! Provisions the crypto tracking schema and sample data on a Supabase
//! project. Run from the repository root so the default script paths
//! resolve.
//!
//! Exits 1 when credentials are missing. Remote failures are reported and
//! do not change the exit status.

use anyhow::Result;
use db_setup::setup::REQUIRED_VARS;
use db_setup::{init_logging, provision, Credentials, ScriptPaths, SupabaseClient};
use std::io;
use tracing::{debug, error, Level};

fn main() -> Result<()> {
    let _guard = init_logging("setup-database", Level::WARN);

    // Real environment variables take precedence over .env
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "Loaded .env");
    }

    let credentials = match Credentials::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Cannot start setup");
            println!("ERROR: Missing Supabase credentials!");
            println!("Required environment variables: {}", REQUIRED_VARS.join(", "));
            std::process::exit(1);
        }
    };

    let client = SupabaseClient::new(&credentials)?;
    let paths = ScriptPaths::from_env();

    provision(&client, &paths, io::stdout().lock())?;

    Ok(())
}
