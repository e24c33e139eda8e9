//! Supabase credentials from the environment

use common::{non_empty, ConfigExt};
use std::fmt;
use thiserror::Error;

pub const SUPABASE_URL: &str = "SUPABASE_URL";
pub const SUPABASE_SERVICE_ROLE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Variables that must be present before anything talks to the service.
pub const REQUIRED_VARS: [&str; 2] = [SUPABASE_URL, SUPABASE_SERVICE_ROLE_KEY];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("Missing Supabase credentials: {}", .missing.join(", "))]
    Missing { missing: Vec<&'static str> },
}

/// Project URL and service-role key.
///
/// The key is redacted from `Debug` output and never logged.
#[derive(Clone)]
pub struct Credentials {
    url: String,
    service_role_key: String,
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Result<Self, CredentialsError> {
        Self::from_lookup(String::env_non_empty)
    }

    /// Resolve credentials through `lookup`. Unset and blank values count as
    /// missing; every missing name is reported, not just the first.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CredentialsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = non_empty(lookup(SUPABASE_URL));
        let key = non_empty(lookup(SUPABASE_SERVICE_ROLE_KEY));

        match (url, key) {
            (Some(url), Some(service_role_key)) => Ok(Self {
                url,
                service_role_key,
            }),
            (url, key) => {
                let mut missing = Vec::new();
                if url.is_none() {
                    missing.push(SUPABASE_URL);
                }
                if key.is_none() {
                    missing.push(SUPABASE_SERVICE_ROLE_KEY);
                }
                Err(CredentialsError::Missing { missing })
            }
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn service_role_key(&self) -> &str {
        &self.service_role_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("service_role_key", &"<redacted>")
            .finish()
    }
}
