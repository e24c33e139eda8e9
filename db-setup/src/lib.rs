//! Database setup for the crypto tracking app
//!
//! Applies the schema and seed scripts to a Supabase project through the
//! `exec_sql` RPC, then checks that price history is readable.

pub mod client;
pub mod error;
pub mod report;
pub mod setup;

pub use client::{CountMode, DatabaseService, QueryOptions, QueryResponse, SupabaseClient};
pub use common::{ConfigExt, init_logging};
pub use error::ServiceError;
pub use setup::{provision, Credentials, CredentialsError, ScriptPaths, SetupReport};
