//! Remote backend tables: the hosted relational service used when configured.
//!
//! `RemoteTables` is the generic query surface the record stores need: equality and
//! `in`-list filters, ordering, insert, update and delete. `PostgrestClient` speaks it
//! over HTTP; tests use `fake::FakeRemote`.

#[cfg(test)]
pub mod fake;
mod postgrest;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use postgrest::PostgrestClient;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected row shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Insert returned no row")]
    EmptyInsert,
}

/// One column condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq { column: String, value: String },
    In { column: String, values: Vec<String> },
}

/// Conjunction of column conditions. An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Into<String>) -> Self {
        self.conditions.push(Condition::Eq {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn any_of(mut self, column: &str, values: &[String]) -> Self {
        self.conditions.push(Condition::In {
            column: column.to_string(),
            values: values.to_vec(),
        });
        self
    }

    /// Evaluates the filter against a JSON row.
    #[cfg(test)]
    pub fn matches(&self, row: &Value) -> bool {
        self.conditions.iter().all(|c| match c {
            Condition::Eq { column, value } => column_text(row, column).as_deref() == Some(value.as_str()),
            Condition::In { column, values } => column_text(row, column)
                .map(|v| values.iter().any(|candidate| *candidate == v))
                .unwrap_or(false),
        })
    }
}

#[cfg(test)]
fn column_text(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Select parameters: filter, newest-first ordering column, optional row window.
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    pub filter: Filter,
    pub order_desc: Option<String>,
    pub limit: Option<usize>,
    /// Rows to skip after ordering.
    pub offset: Option<usize>,
}

#[async_trait]
pub trait RemoteTables: Send + Sync {
    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>, RemoteError>;

    /// Inserts one row and returns it as stored (with server-assigned columns).
    async fn insert(&self, table: &str, row: &Value) -> Result<Value, RemoteError>;

    async fn update(&self, table: &str, filter: &Filter, patch: &Value) -> Result<(), RemoteError>;

    async fn delete(&self, table: &str, filter: &Filter) -> Result<(), RemoteError>;
}
