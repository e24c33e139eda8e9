//! Remote service errors
//!
//! Failures of the hosted database are classified so the report can tell a
//! network problem from a rejected key, a missing function or table, or a
//! bad statement.

use serde::Deserialize;
use thiserror::Error;

/// SQLSTATE for `insufficient_privilege`.
const SQLSTATE_INSUFFICIENT_PRIVILEGE: &str = "42501";
/// SQLSTATE for `undefined_table`.
const SQLSTATE_UNDEFINED_TABLE: &str = "42P01";
/// SQLSTATE for `undefined_function`.
const SQLSTATE_UNDEFINED_FUNCTION: &str = "42883";
/// PostgREST code for an RPC that is not in its schema cache.
const PGRST_FUNCTION_NOT_FOUND: &str = "PGRST202";
/// PostgREST code for a table that is not in its schema cache.
const PGRST_TABLE_NOT_FOUND: &str = "PGRST205";

/// A failed call to the remote database service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("permission denied (HTTP {status}): {message}")]
    Permission { status: u16, message: String },

    #[error("not found (HTTP {status}): {message}")]
    NotFound { status: u16, message: String },

    #[error("SQL error {code}: {message}")]
    Sql { code: String, message: String },

    #[error("service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ServiceError::InvalidResponse(e.to_string())
        } else {
            ServiceError::Network(e)
        }
    }
}

impl ServiceError {
    /// Short operator guidance for this kind of failure.
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::Network(_) => "Check SUPABASE_URL and that the project is reachable.",
            Self::Permission { .. } => {
                "Check that SUPABASE_SERVICE_ROLE_KEY holds the service-role key, not the anon key."
            }
            Self::NotFound { .. } => {
                "The exec_sql function or the queried table does not exist yet; create it or run the scripts in the Supabase SQL Editor."
            }
            Self::Sql { .. } => "Fix the reported statement and run the script again.",
            Self::Service { .. } => "The service failed while handling the request; retry later.",
            Self::InvalidResponse(_) => "The service answered with an unexpected payload.",
        }
    }
}

/// Error body returned by PostgREST.
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

impl PostgrestError {
    fn describe(&self, raw: &str) -> String {
        let mut text = match &self.message {
            Some(m) if !m.is_empty() => m.clone(),
            _ => raw.trim().to_string(),
        };
        if let Some(details) = self.details.as_deref().filter(|d| !d.is_empty()) {
            text.push_str(&format!(" ({})", details));
        }
        if let Some(hint) = self.hint.as_deref().filter(|h| !h.is_empty()) {
            text.push_str(&format!(" hint: {}", hint));
        }
        if text.is_empty() {
            text = "no error body".to_string();
        }
        text
    }
}

/// Build a [`ServiceError`] from a non-success HTTP status and its body.
pub fn classify(status: u16, body: &str) -> ServiceError {
    let parsed: PostgrestError = serde_json::from_str(body).unwrap_or_default();
    let message = parsed.describe(body);
    let code = parsed.code.unwrap_or_default();

    match code.as_str() {
        SQLSTATE_INSUFFICIENT_PRIVILEGE => return ServiceError::Permission { status, message },
        SQLSTATE_UNDEFINED_TABLE
        | SQLSTATE_UNDEFINED_FUNCTION
        | PGRST_FUNCTION_NOT_FOUND
        | PGRST_TABLE_NOT_FOUND => return ServiceError::NotFound { status, message },
        _ => {}
    }

    match status {
        401 | 403 => ServiceError::Permission { status, message },
        404 => ServiceError::NotFound { status, message },
        400..=499 if is_sqlstate(&code) => ServiceError::Sql { code, message },
        _ => ServiceError::Service { status, message },
    }
}

/// SQLSTATE codes are five characters of digits and uppercase letters.
fn is_sqlstate(code: &str) -> bool {
    code.len() == 5
        && code
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
}
