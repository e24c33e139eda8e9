//! Supabase REST client
//!
//! The setup steps only need two capabilities from the hosted database:
//! running raw SQL through the `exec_sql` RPC and reading rows from a table.
//! Both are expressed by [`DatabaseService`] so the runner can be driven by a
//! substitute in tests.

use crate::error::{classify, ServiceError};
use crate::setup::Credentials;
use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::Url;
use serde_json::{json, Value};
use tracing::{debug, instrument};

/// Name of the RPC that executes arbitrary SQL on the server.
pub const EXEC_SQL_RPC: &str = "exec_sql";

/// How many rows a query should count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountMode {
    /// Rows only.
    #[default]
    None,
    /// Rows plus the exact total reported by the server.
    Exact,
}

/// Options for [`DatabaseService::query`].
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryOptions {
    pub count: CountMode,
}

impl QueryOptions {
    /// Fetch rows and ask for the exact total.
    pub fn exact_count() -> Self {
        Self {
            count: CountMode::Exact,
        }
    }
}

/// Rows returned by a query, with the total when it was requested.
#[derive(Debug, Clone, Default)]
pub struct QueryResponse {
    pub rows: Vec<Value>,
    pub count: Option<u64>,
}

/// Operations the setup runner needs from the remote database.
pub trait DatabaseService {
    /// Run a SQL script on the server.
    fn execute_sql(&self, sql: &str) -> Result<(), ServiceError>;

    /// Select `columns` from `table`.
    fn query(
        &self,
        table: &str,
        columns: &str,
        options: QueryOptions,
    ) -> Result<QueryResponse, ServiceError>;
}

/// Blocking client for a Supabase project's PostgREST endpoint.
pub struct SupabaseClient {
    http: Client,
    rest_url: Url,
}

impl SupabaseClient {
    /// Build a client authenticated with the service-role key.
    ///
    /// No request is made here; a malformed URL or a key that cannot be sent
    /// as a header is reported immediately.
    pub fn new(credentials: &Credentials) -> Result<Self> {
        let rest_url = rest_url(credentials.url())?;

        let mut headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(credentials.service_role_key())
            .context("Service role key is not a valid header value")?;
        api_key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!(
            "Bearer {}",
            credentials.service_role_key()
        ))
        .context("Service role key is not a valid header value")?;
        bearer.set_sensitive(true);
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        debug!(endpoint = %rest_url, "Supabase client ready");

        Ok(Self { http, rest_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.rest_url
            .join(path)
            .map_err(|e| ServiceError::InvalidResponse(format!("bad endpoint {}: {}", path, e)))
    }
}

impl DatabaseService for SupabaseClient {
    #[instrument(skip_all, fields(bytes = sql.len()))]
    fn execute_sql(&self, sql: &str) -> Result<(), ServiceError> {
        let url = self.endpoint(&format!("rpc/{}", EXEC_SQL_RPC))?;
        let resp = self.http.post(url).json(&json!({ "sql": sql })).send()?;
        let status = resp.status();
        check_status(resp)?;
        debug!(%status, "exec_sql accepted");
        Ok(())
    }

    #[instrument(skip(self))]
    fn query(
        &self,
        table: &str,
        columns: &str,
        options: QueryOptions,
    ) -> Result<QueryResponse, ServiceError> {
        let url = self.endpoint(table)?;
        let mut req = self.http.get(url).query(&[("select", columns)]);
        if options.count == CountMode::Exact {
            req = req.header("Prefer", "count=exact");
        }

        let resp = check_status(req.send()?)?;

        let count = match options.count {
            CountMode::Exact => {
                let header = resp
                    .headers()
                    .get(CONTENT_RANGE)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| {
                        ServiceError::InvalidResponse("missing Content-Range header".to_string())
                    })?;
                Some(parse_content_range(header)?)
            }
            CountMode::None => None,
        };

        let rows: Vec<Value> = resp.json()?;
        debug!(rows = rows.len(), ?count, "Query returned");

        Ok(QueryResponse { rows, count })
    }
}

/// Turn a non-success response into a classified error.
fn check_status(resp: Response) -> Result<Response, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(classify(status.as_u16(), &body))
}

/// Derive `<project>/rest/v1/` from the project URL.
fn rest_url(project_url: &str) -> Result<Url> {
    let base = Url::parse(project_url)
        .with_context(|| format!("SUPABASE_URL is not a valid URL: {}", project_url))?;
    if base.cannot_be_a_base() {
        anyhow::bail!("SUPABASE_URL cannot be used as a base URL: {}", project_url);
    }
    let mut path = base.path().trim_end_matches('/').to_string();
    path.push_str("/rest/v1/");
    let mut rest = base;
    rest.set_path(&path);
    rest.set_query(None);
    rest.set_fragment(None);
    Ok(rest)
}

/// Read the total from a PostgREST `Content-Range` value such as `0-11/12`
/// or `*/0`.
pub fn parse_content_range(value: &str) -> Result<u64, ServiceError> {
    let total = value
        .rsplit_once('/')
        .map(|(_, total)| total.trim())
        .ok_or_else(|| ServiceError::InvalidResponse(format!("bad Content-Range: {}", value)))?;
    total.parse().map_err(|_| {
        ServiceError::InvalidResponse(format!("Content-Range has no exact count: {}", value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(url: &str, key: &str) -> Credentials {
        Credentials::from_lookup(|name| match name {
            "SUPABASE_URL" => Some(url.to_string()),
            "SUPABASE_SERVICE_ROLE_KEY" => Some(key.to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_content_range_with_rows() {
        assert_eq!(parse_content_range("0-11/12").unwrap(), 12);
    }

    #[test]
    fn test_content_range_empty_table() {
        assert_eq!(parse_content_range("*/0").unwrap(), 0);
    }

    #[test]
    fn test_content_range_without_total_is_invalid() {
        assert!(matches!(
            parse_content_range("0-24/*"),
            Err(ServiceError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_content_range("garbage"),
            Err(ServiceError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_rest_url_normalizes_trailing_slash() {
        assert_eq!(
            rest_url("https://abc.supabase.co").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/"
        );
        assert_eq!(
            rest_url("https://abc.supabase.co/").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/"
        );
        assert_eq!(
            rest_url("http://localhost:54321/proxy/").unwrap().as_str(),
            "http://localhost:54321/proxy/rest/v1/"
        );
    }

    #[test]
    fn test_rest_url_drops_query_and_fragment() {
        assert_eq!(
            rest_url("https://abc.supabase.co/?x=1#a").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/"
        );
        let client =
            SupabaseClient::new(&credentials("https://abc.supabase.co/#a", "key")).unwrap();
        assert_eq!(
            client.endpoint("rpc/exec_sql").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/rpc/exec_sql"
        );
    }

    #[test]
    fn test_rest_url_rejects_garbage() {
        assert!(rest_url("not a url").is_err());
        assert!(rest_url("mailto:ops@example.com").is_err());
    }

    #[test]
    fn test_endpoints_are_under_rest_root() {
        let client = SupabaseClient::new(&credentials("https://abc.supabase.co", "key")).unwrap();
        assert_eq!(
            client.endpoint("rpc/exec_sql").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/rpc/exec_sql"
        );
        assert_eq!(
            client.endpoint("price_history").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/price_history"
        );
    }

    #[test]
    fn test_key_with_newline_is_rejected() {
        let creds = credentials("https://abc.supabase.co", "bad\nkey");
        assert!(SupabaseClient::new(&creds).is_err());
    }
}
