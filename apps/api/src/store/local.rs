use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{new_local_id, sort_newest_first, RecordStore, StoreError, StoredRecord};
use crate::identity::SessionId;
use crate::kv::KeyValueStore;

/// Keeps one record kind as a JSON array under its fixed local key.
///
/// Every mutation is a whole-collection read-modify-write, serialized by
/// `write_lock` so concurrent writers cannot lose each other's updates.
pub struct LocalStore<R> {
    kv: Arc<dyn KeyValueStore>,
    session: SessionId,
    write_lock: Mutex<()>,
    _kind: PhantomData<fn() -> R>,
}

impl<R: StoredRecord> LocalStore<R> {
    pub fn new(kv: Arc<dyn KeyValueStore>, session: SessionId) -> Self {
        Self {
            kv,
            session,
            write_lock: Mutex::new(()),
            _kind: PhantomData,
        }
    }

    /// Reads the stored collection. Unparseable contents read as empty.
    async fn load(&self) -> Result<Vec<R>, StoreError> {
        let Some(raw) = self.kv.get(R::LOCAL_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<R>>(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(
                    "Discarding unreadable local {} under '{}': {e}",
                    R::LABEL,
                    R::LOCAL_KEY
                );
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, records: &[R]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(records)?;
        self.kv.set(R::LOCAL_KEY, &raw).await?;
        Ok(())
    }

    pub async fn records(&self) -> Result<Vec<R>, StoreError> {
        let mut records = self.load().await?;
        sort_newest_first(&mut records);
        Ok(records)
    }

    /// Prepends a new record with a locally minted id and applies the retention cap.
    /// Does not validate; callers run `StoredRecord::validate` first.
    pub async fn insert(&self, draft: R::Draft) -> Result<R, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;

        let record = R::materialize(draft, new_local_id(), &self.session, Utc::now());
        records.insert(0, record.clone());
        if let Some(cap) = R::RETENTION_CAP {
            sort_newest_first(&mut records);
            records.truncate(cap);
        }

        self.save(&records).await?;
        debug!("Stored local {} record {}", R::LABEL, record.id());
        Ok(record)
    }

    /// Removes matching records and returns how many were dropped.
    pub async fn remove(&self, ids: &[String]) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|r| !ids.iter().any(|id| id == r.id()));
        let removed = before - records.len();
        if removed > 0 {
            self.save(&records).await?;
        }
        Ok(removed)
    }

    /// Applies `change` to the record with `id`. `None` when it is not stored.
    pub async fn modify<F>(&self, id: &str, change: F) -> Result<Option<R>, StoreError>
    where
        F: FnOnce(&mut R) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        let Some(record) = records.iter_mut().find(|r| r.id() == id) else {
            return Ok(None);
        };
        change(record);
        let updated = record.clone();
        self.save(&records).await?;
        Ok(Some(updated))
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.kv.remove(R::LOCAL_KEY).await?;
        Ok(())
    }
}

#[async_trait]
impl<R: StoredRecord> RecordStore<R> for LocalStore<R> {
    async fn list(&self) -> Result<Vec<R>, StoreError> {
        self.records().await
    }

    async fn create(&self, draft: R::Draft) -> Result<String, StoreError> {
        R::validate(&draft)?;
        Ok(self.insert(draft).await?.id().to_string())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.remove(&[id.to_string()]).await?;
        Ok(())
    }

    async fn delete_many(&self, ids: &[String]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        self.remove(ids).await?;
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        self.clear().await
    }
}
