use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::{is_local_id, sort_newest_first, LocalStore, RecordStore, StoreError, StoredRecord};
use crate::identity::SessionId;
use crate::remote::{Filter, RemoteError, RemoteTables, SelectQuery};

/// Remote-preferred store for a session-scoped kind, with a local fallback for
/// failed reads and failed creates.
pub struct RemoteStore<R: StoredRecord> {
    remote: Arc<dyn RemoteTables>,
    fallback: Arc<LocalStore<R>>,
    session: SessionId,
}

impl<R: StoredRecord> RemoteStore<R> {
    pub fn new(
        remote: Arc<dyn RemoteTables>,
        fallback: Arc<LocalStore<R>>,
        session: SessionId,
    ) -> Self {
        Self {
            remote,
            fallback,
            session,
        }
    }

    fn scope(&self) -> Filter {
        if R::SESSION_SCOPED {
            Filter::new().eq("session_id", self.session.as_str())
        } else {
            Filter::new()
        }
    }

    /// Deletes this session's rows beyond the newest `cap`.
    async fn prune_beyond(&self, cap: usize) -> Result<(), RemoteError> {
        let query = SelectQuery {
            filter: self.scope(),
            order_desc: Some("created_at".to_string()),
            limit: None,
            offset: Some(cap),
        };
        let ids: Vec<String> = self
            .remote
            .select(R::TABLE, &query)
            .await?
            .iter()
            .filter_map(|row| match row.get("id")? {
                Value::String(id) => Some(id.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect();
        if ids.is_empty() {
            return Ok(());
        }
        self.remote
            .delete(R::TABLE, &self.scope().any_of("id", &ids))
            .await?;
        debug!("Trimmed {} old {} rows", ids.len(), R::LABEL);
        Ok(())
    }
}

/// Selects rows newest-first and decodes them, skipping rows that do not decode.
pub(crate) async fn fetch_records<R: StoredRecord>(
    remote: &dyn RemoteTables,
    filter: Filter,
) -> Result<Vec<R>, RemoteError> {
    let query = SelectQuery {
        filter,
        order_desc: Some("created_at".to_string()),
        limit: R::RETENTION_CAP,
        offset: None,
    };
    let rows = remote.select(R::TABLE, &query).await?;
    let mut records: Vec<R> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<R>(row) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed {} row: {e}", R::LABEL);
                None
            }
        })
        .collect();
    sort_newest_first(&mut records);
    Ok(records)
}

/// Inserts a row and returns the server-assigned identifier.
pub(crate) async fn insert_row<R: StoredRecord>(
    remote: &dyn RemoteTables,
    draft: &R::Draft,
    session: &SessionId,
) -> Result<String, StoreError> {
    let row = R::remote_row(draft, session)?;
    let stored = remote.insert(R::TABLE, &row).await?;
    match stored.get("id") {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(RemoteError::EmptyInsert.into()),
    }
}

#[async_trait]
impl<R: StoredRecord> RecordStore<R> for RemoteStore<R> {
    /// Remote rows plus any records that fell back to local storage on create.
    async fn list(&self) -> Result<Vec<R>, StoreError> {
        let mut records = match fetch_records::<R>(self.remote.as_ref(), self.scope()).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Remote {} unavailable, reading local copy: {e}", R::LABEL);
                return self.fallback.records().await;
            }
        };
        let stranded = self.fallback.records().await?;
        if !stranded.is_empty() {
            records.extend(stranded);
            sort_newest_first(&mut records);
            if let Some(cap) = R::RETENTION_CAP {
                records.truncate(cap);
            }
        }
        Ok(records)
    }

    async fn create(&self, draft: R::Draft) -> Result<String, StoreError> {
        R::validate(&draft)?;
        match insert_row::<R>(self.remote.as_ref(), &draft, &self.session).await {
            Ok(id) => {
                debug!("Inserted remote {} record {id}", R::LABEL);
                if let Some(cap) = R::RETENTION_CAP {
                    if let Err(e) = self.prune_beyond(cap).await {
                        warn!("Could not trim remote {} to {cap} rows: {e}", R::LABEL);
                    }
                }
                Ok(id)
            }
            Err(e) => {
                warn!("Remote {} insert failed, storing locally: {e}", R::LABEL);
                Ok(self.fallback.insert(draft).await?.id().to_string())
            }
        }
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        if is_local_id(id) {
            self.fallback.remove(&[id.to_string()]).await?;
            return Ok(());
        }
        let filter = self.scope().eq("id", id);
        self.remote.delete(R::TABLE, &filter).await.map_err(|e| {
            error!("Failed to delete {} record {id}: {e}", R::LABEL);
            StoreError::from(e)
        })
    }

    async fn delete_many(&self, ids: &[String]) -> Result<(), StoreError> {
        let (local_ids, remote_ids): (Vec<String>, Vec<String>) =
            ids.iter().cloned().partition(|id| is_local_id(id));

        if !local_ids.is_empty() {
            self.fallback.remove(&local_ids).await?;
        }
        if remote_ids.is_empty() {
            return Ok(());
        }
        let filter = self.scope().any_of("id", &remote_ids);
        self.remote.delete(R::TABLE, &filter).await.map_err(|e| {
            error!("Failed to delete {} {} records: {e}", remote_ids.len(), R::LABEL);
            StoreError::from(e)
        })
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        if !R::SESSION_SCOPED {
            return Err(StoreError::Validation(format!(
                "refusing to clear unscoped remote table {}",
                R::TABLE
            )));
        }
        self.fallback.clear().await?;
        self.remote.delete(R::TABLE, &self.scope()).await.map_err(|e| {
            error!("Failed to clear {}: {e}", R::LABEL);
            StoreError::from(e)
        })
    }
}
