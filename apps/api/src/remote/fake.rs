//! Scripted in-memory stand-in for the hosted backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::{Filter, RemoteError, RemoteTables, SelectQuery};

#[derive(Default)]
pub struct FakeRemote {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub calls: AtomicUsize,
    pub inserted: Mutex<Vec<(String, Value)>>,
    pub deleted: Mutex<Vec<(String, Filter)>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let fake = Self::default();
        fake.fail_reads.store(true, Ordering::SeqCst);
        fake.fail_writes.store(true, Ordering::SeqCst);
        fake
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Seeds a row directly, bypassing call counting.
    pub fn seed(&self, table: &str, row: Value) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    fn unavailable() -> RemoteError {
        RemoteError::Api {
            status: 503,
            message: "service unavailable".to_string(),
        }
    }

    fn begin(&self, write: bool) -> Result<(), RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let flag = if write { &self.fail_writes } else { &self.fail_reads };
        if flag.load(Ordering::SeqCst) {
            Err(Self::unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteTables for FakeRemote {
    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>, RemoteError> {
        self.begin(false)?;
        let mut rows: Vec<Value> = self
            .rows(table)
            .into_iter()
            .filter(|r| query.filter.matches(r))
            .collect();
        if let Some(column) = &query.order_desc {
            rows.sort_by(|a, b| {
                let a = a.get(column).and_then(Value::as_str).unwrap_or_default();
                let b = b.get(column).and_then(Value::as_str).unwrap_or_default();
                b.cmp(a)
            });
        }
        let mut rows: Vec<Value> = rows.into_iter().skip(query.offset.unwrap_or(0)).collect();
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: &Value) -> Result<Value, RemoteError> {
        self.begin(true)?;
        let mut stored = row.clone();
        if let Value::Object(map) = &mut stored {
            map.entry("id")
                .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
            map.entry("created_at")
                .or_insert_with(|| Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)));
        }
        self.inserted
            .lock()
            .unwrap()
            .push((table.to_string(), row.clone()));
        self.seed(table, stored.clone());
        Ok(stored)
    }

    async fn update(&self, table: &str, filter: &Filter, patch: &Value) -> Result<(), RemoteError> {
        self.begin(true)?;
        let mut tables = self.tables.lock().unwrap();
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| filter.matches(r)) {
                if let (Value::Object(target), Value::Object(changes)) = (row, patch) {
                    for (k, v) in changes {
                        target.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<(), RemoteError> {
        self.begin(true)?;
        self.deleted
            .lock()
            .unwrap()
            .push((table.to_string(), filter.clone()));
        let mut tables = self.tables.lock().unwrap();
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|r| !filter.matches(r));
        }
        Ok(())
    }
}
