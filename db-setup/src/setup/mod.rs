//! Setup runner components
//!
//! - Credential resolution from the environment
//! - SQL script loading
//! - The schema / seed / verify sequence

mod credentials;
mod runner;
mod scripts;
mod verification;

pub use credentials::{
    Credentials, CredentialsError, REQUIRED_VARS, SUPABASE_SERVICE_ROLE_KEY, SUPABASE_URL,
};
pub use runner::{apply_schema, apply_seed, provision, run_setup, SetupReport};
pub use scripts::{ScriptPaths, SqlScripts, DEFAULT_SCHEMA_SQL, DEFAULT_SEED_SQL};
pub use verification::{verify, Verification, VERIFY_COLUMN, VERIFY_TABLE};
