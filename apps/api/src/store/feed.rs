use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use super::{RecordStore, StoreError, StoredRecord};

/// Last-listed snapshot of one record kind, plus the store behind it.
///
/// Removals drop the record from the snapshot before the store is called, so
/// the view stays responsive whatever the store reports. The store's error is
/// still returned to the caller.
pub struct RecordFeed<R: StoredRecord> {
    store: Arc<dyn RecordStore<R>>,
    view: RwLock<Vec<R>>,
}

impl<R: StoredRecord> RecordFeed<R> {
    pub fn new(store: Arc<dyn RecordStore<R>>) -> Self {
        Self {
            store,
            view: RwLock::new(Vec::new()),
        }
    }

    pub async fn refresh(&self) -> Result<Vec<R>, StoreError> {
        let records = self.store.list().await?;
        *self.view.write().await = records.clone();
        Ok(records)
    }

    #[cfg(test)]
    pub async fn snapshot(&self) -> Vec<R> {
        self.view.read().await.clone()
    }

    pub async fn create(&self, draft: R::Draft) -> Result<String, StoreError> {
        let id = self.store.create(draft).await?;
        if let Err(e) = self.refresh().await {
            warn!("Created {} record {id} but could not refresh: {e}", R::LABEL);
        }
        Ok(id)
    }

    pub async fn remove(&self, id: &str) -> Result<(), StoreError> {
        self.view.write().await.retain(|r| r.id() != id);
        self.store.delete(id).await
    }

    pub async fn remove_many(&self, ids: &[String]) -> Result<(), StoreError> {
        self.view
            .write()
            .await
            .retain(|r| !ids.iter().any(|id| id == r.id()));
        self.store.delete_many(ids).await
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.view.write().await.clear();
        self.store.clear_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SessionId;
    use crate::kv::MemoryKv;
    use crate::models::AnalysisRecord;
    use crate::remote::fake::FakeRemote;
    use crate::store::test_support::analysis;
    use crate::store::{LocalStore, RemoteStore};
    use std::sync::atomic::Ordering;

    fn remote_feed(fake: Arc<FakeRemote>) -> RecordFeed<AnalysisRecord> {
        let session = SessionId::from("s");
        let local = Arc::new(LocalStore::<AnalysisRecord>::new(
            Arc::new(MemoryKv::new()),
            session.clone(),
        ));
        RecordFeed::new(Arc::new(RemoteStore::new(fake, local, session)))
    }

    #[tokio::test]
    async fn test_create_refreshes_snapshot() {
        let feed = remote_feed(Arc::new(FakeRemote::new()));
        let id = feed.create(analysis("cv.pdf", 70)).await.unwrap();

        let snapshot = feed.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);
    }

    #[tokio::test]
    async fn test_remove_updates_view_even_when_store_fails() {
        let fake = Arc::new(FakeRemote::new());
        let feed = remote_feed(fake.clone());
        let keep = feed.create(analysis("keep.pdf", 70)).await.unwrap();
        let gone = feed.create(analysis("drop.pdf", 40)).await.unwrap();

        fake.fail_writes.store(true, Ordering::SeqCst);
        let result = feed.remove(&gone).await;

        assert!(result.is_err());
        let ids: Vec<String> = feed.snapshot().await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![keep]);
    }

    #[tokio::test]
    async fn test_remove_many_and_clear() {
        let feed = remote_feed(Arc::new(FakeRemote::new()));
        let a = feed.create(analysis("a.pdf", 10)).await.unwrap();
        let b = feed.create(analysis("b.pdf", 20)).await.unwrap();
        feed.create(analysis("c.pdf", 30)).await.unwrap();

        feed.remove_many(&[a, b]).await.unwrap();
        assert_eq!(feed.snapshot().await.len(), 1);
        assert_eq!(feed.refresh().await.unwrap().len(), 1);

        feed.clear().await.unwrap();
        assert!(feed.snapshot().await.is_empty());
        assert!(feed.refresh().await.unwrap().is_empty());
    }
}
