//! Record stores — list/create/delete/clear over one record kind, backend-routed.
//!
//! `build_stores` picks the variant once at startup:
//! - `LocalStore` when no remote backend is configured,
//! - `RemoteStore` (with a `LocalStore` fallback) when it is,
//! - `CandidateStore` for candidates, which routes by id prefix instead.
//!
//! Reads degrade silently to local data. Writes never drop silently: a create
//! falls back to local storage, every other failed write surfaces to the caller.

mod candidates;
mod factory;
mod feed;
mod local;
mod remote;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::identity::SessionId;
use crate::kv::KvError;
use crate::remote::RemoteError;

pub use candidates::CandidateStore;
pub use factory::{build_stores, Stores};
pub use feed::RecordFeed;
pub use local::LocalStore;
pub use remote::RemoteStore;

/// Prefix of identifiers minted on this machine rather than by the remote backend.
pub const LOCAL_ID_PREFIX: &str = "local-";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Remote backend error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Local storage error: {0}")]
    Local(#[from] KvError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A record kind the stores know how to persist.
pub trait StoredRecord: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Caller-supplied fields, before an id and timestamp are assigned.
    type Draft: Serialize + Send + Sync + 'static;

    const LABEL: &'static str;
    const TABLE: &'static str;
    const LOCAL_KEY: &'static str;
    const RETENTION_CAP: Option<usize> = None;
    /// Whether remote rows are filtered by the session identifier.
    const SESSION_SCOPED: bool = true;

    fn id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;

    /// Rejects incomplete drafts before any store is touched.
    fn validate(draft: &Self::Draft) -> Result<(), StoreError>;

    fn materialize(draft: Self::Draft, id: String, session: &SessionId, now: DateTime<Utc>)
        -> Self;

    /// Insert payload for the remote table. Id and `created_at` are server-assigned.
    fn remote_row(draft: &Self::Draft, session: &SessionId) -> Result<Value, serde_json::Error> {
        let mut row = serde_json::to_value(draft)?;
        if Self::SESSION_SCOPED {
            if let Value::Object(map) = &mut row {
                map.insert(
                    "session_id".to_string(),
                    Value::String(session.to_string()),
                );
            }
        }
        Ok(row)
    }
}

/// The store contract shared by every backend. Carried as `Arc<dyn RecordStore<R>>`.
#[async_trait]
pub trait RecordStore<R: StoredRecord>: Send + Sync {
    /// Newest first by `created_at`.
    async fn list(&self) -> Result<Vec<R>, StoreError>;

    /// Returns the identifier of the stored record.
    async fn create(&self, draft: R::Draft) -> Result<String, StoreError>;

    /// Unknown identifiers are a no-op.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    async fn delete_many(&self, ids: &[String]) -> Result<(), StoreError>;

    async fn clear_all(&self) -> Result<(), StoreError>;
}

pub fn is_local_id(id: &str) -> bool {
    id.starts_with(LOCAL_ID_PREFIX)
}

/// Mints `local-<unix millis>-<8 hex>`; the suffix keeps same-millisecond ids apart.
pub fn new_local_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{LOCAL_ID_PREFIX}{}-{}",
        Utc::now().timestamp_millis(),
        &suffix[..8]
    )
}

/// Stable sort, so records sharing a timestamp keep their stored order.
pub(crate) fn sort_newest_first<R: StoredRecord>(records: &mut [R]) {
    records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
}
