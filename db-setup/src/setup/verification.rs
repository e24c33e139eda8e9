//! Post-setup verification query

use crate::client::{DatabaseService, QueryOptions, QueryResponse};
use crate::error::ServiceError;
use std::collections::BTreeSet;
use tracing::instrument;

pub const VERIFY_TABLE: &str = "price_history";
pub const VERIFY_COLUMN: &str = "symbol";

/// What the verification query found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// Total rows in the table as counted by the server.
    pub count: u64,
    /// Distinct symbols, sorted.
    pub symbols: BTreeSet<String>,
}

impl Verification {
    /// Fold a counted query response into a count and a sorted symbol set.
    pub fn from_response(resp: QueryResponse) -> Result<Self, ServiceError> {
        let count = resp.count.ok_or_else(|| {
            ServiceError::InvalidResponse("query response carries no row count".to_string())
        })?;

        let symbols = resp
            .rows
            .iter()
            .map(|row| {
                row.get(VERIFY_COLUMN)
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .ok_or_else(|| {
                        ServiceError::InvalidResponse(format!(
                            "row without a string {}: {}",
                            VERIFY_COLUMN, row
                        ))
                    })
            })
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Self { count, symbols })
    }

    /// Symbols joined for display, e.g. `BTC, ETH, SOL`.
    pub fn symbol_list(&self) -> String {
        self.symbols
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Count the price history rows and collect their symbols in one query.
#[instrument(skip_all)]
pub fn verify<S: DatabaseService + ?Sized>(service: &S) -> Result<Verification, ServiceError> {
    let resp = service.query(VERIFY_TABLE, VERIFY_COLUMN, QueryOptions::exact_count())?;
    Verification::from_response(resp)
}
