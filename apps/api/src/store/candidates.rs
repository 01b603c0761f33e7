use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};

use super::remote::{fetch_records, insert_row};
use super::{is_local_id, sort_newest_first, LocalStore, RecordStore, StoreError, StoredRecord};
use crate::identity::SessionId;
use crate::models::{CandidateStatus, LocalCandidate};
use crate::remote::{Filter, RemoteTables};

/// Candidate tracking. Routes by identifier, not by configuration: `local-` ids
/// are only ever looked up in local storage, even while the remote is configured.
pub struct CandidateStore {
    local: Arc<LocalStore<LocalCandidate>>,
    remote: Option<Arc<dyn RemoteTables>>,
    session: SessionId,
}

impl CandidateStore {
    pub fn new(
        local: Arc<LocalStore<LocalCandidate>>,
        remote: Option<Arc<dyn RemoteTables>>,
        session: SessionId,
    ) -> Self {
        Self {
            local,
            remote,
            session,
        }
    }

    /// The remote handle, unless `id` was minted locally.
    fn remote_for(&self, id: &str) -> Option<&Arc<dyn RemoteTables>> {
        if is_local_id(id) {
            None
        } else {
            self.remote.as_ref()
        }
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: CandidateStatus,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        match self.remote_for(id) {
            Some(remote) => {
                let patch = json!({ "status": status, "updated_at": now });
                remote
                    .update(LocalCandidate::TABLE, &Filter::new().eq("id", id), &patch)
                    .await
                    .map_err(|e| {
                        error!("Failed to update candidate {id}: {e}");
                        StoreError::from(e)
                    })?;
            }
            None => {
                let updated = self
                    .local
                    .modify(id, |c| {
                        c.status = status;
                        c.updated_at = Some(now);
                    })
                    .await?;
                if updated.is_none() {
                    return Err(StoreError::NotFound(format!("candidate {id}")));
                }
            }
        }
        info!("Candidate {id} moved to {}", status.as_str());
        Ok(())
    }
}

#[async_trait]
impl RecordStore<LocalCandidate> for CandidateStore {
    /// Remote rows (when reachable) merged with locally created entries.
    async fn list(&self) -> Result<Vec<LocalCandidate>, StoreError> {
        let mut records = self.local.records().await?;
        if let Some(remote) = &self.remote {
            match fetch_records::<LocalCandidate>(remote.as_ref(), Filter::new()).await {
                Ok(rows) => records.extend(rows),
                Err(e) => warn!("Remote candidates unavailable, showing local only: {e}"),
            }
        }
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn create(&self, draft: <LocalCandidate as StoredRecord>::Draft) -> Result<String, StoreError> {
        LocalCandidate::validate(&draft)?;
        if let Some(remote) = &self.remote {
            match insert_row::<LocalCandidate>(remote.as_ref(), &draft, &self.session).await {
                Ok(id) => return Ok(id),
                Err(e) => warn!("Remote candidate insert failed, storing locally: {e}"),
            }
        }
        Ok(self.local.insert(draft).await?.id)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        match self.remote_for(id) {
            Some(remote) => remote
                .delete(LocalCandidate::TABLE, &Filter::new().eq("id", id))
                .await
                .map_err(|e| {
                    error!("Failed to delete candidate {id}: {e}");
                    StoreError::from(e)
                }),
            None => {
                self.local.remove(&[id.to_string()]).await?;
                Ok(())
            }
        }
    }

    async fn delete_many(&self, ids: &[String]) -> Result<(), StoreError> {
        let (local_ids, remote_ids): (Vec<String>, Vec<String>) = ids
            .iter()
            .cloned()
            .partition(|id| self.remote_for(id).is_none());

        if !local_ids.is_empty() {
            self.local.remove(&local_ids).await?;
        }
        if let (Some(remote), false) = (&self.remote, remote_ids.is_empty()) {
            remote
                .delete(LocalCandidate::TABLE, &Filter::new().any_of("id", &remote_ids))
                .await
                .map_err(|e| {
                    error!("Failed to delete {} candidates: {e}", remote_ids.len());
                    StoreError::from(e)
                })?;
        }
        Ok(())
    }

    /// Clears guest entries only. Remote candidates belong to the backend account.
    async fn clear_all(&self) -> Result<(), StoreError> {
        self.local.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{KeyValueStore, MemoryKv};
    use crate::models::CandidateDraft;
    use crate::remote::fake::FakeRemote;
    use std::sync::atomic::Ordering;

    fn draft(name: &str) -> CandidateDraft {
        CandidateDraft {
            name: name.to_string(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            applied_role: "Platform Engineer".to_string(),
            latest_score: Some(77),
            matched_skills: vec!["rust".to_string()],
            ..Default::default()
        }
    }

    fn build(remote: Option<Arc<FakeRemote>>) -> (CandidateStore, Arc<LocalStore<LocalCandidate>>) {
        let kv = Arc::new(MemoryKv::new());
        let session = SessionId::from("s");
        let local = Arc::new(LocalStore::new(kv, session.clone()));
        let remote = remote.map(|r| r as Arc<dyn RemoteTables>);
        (CandidateStore::new(local.clone(), remote, session), local)
    }

    #[tokio::test]
    async fn test_local_id_delete_never_touches_remote() {
        let kv = Arc::new(MemoryKv::new());
        let session = SessionId::from("s");
        let guest = LocalCandidate::materialize(
            draft("Ada"),
            "local-1700000000000".to_string(),
            &session,
            Utc::now(),
        );
        kv.set(
            LocalCandidate::LOCAL_KEY,
            &serde_json::to_string(&vec![guest]).unwrap(),
        )
        .await
        .unwrap();

        let fake = Arc::new(FakeRemote::new());
        let local = Arc::new(LocalStore::new(kv, session.clone()));
        let store = CandidateStore::new(local.clone(), Some(fake.clone() as Arc<dyn RemoteTables>), session);

        store.delete("local-1700000000000").await.unwrap();

        assert_eq!(fake.call_count(), 0);
        assert!(local.records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_guest_create_is_local_and_prefixed() {
        let (store, _) = build(None);
        let id = store.create(draft("Grace")).await.unwrap();
        assert!(is_local_id(&id));

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, CandidateStatus::Pending);
        assert_eq!(listed[0].latest_score, Some(77));
    }

    #[tokio::test]
    async fn test_list_merges_remote_and_local_newest_first() {
        let fake = Arc::new(FakeRemote::new());
        fake.seed(
            "candidates",
            json!({
                "id": "remote-1",
                "name": "Remote Person",
                "applied_role": "SRE",
                "status": "reviewed",
                "created_at": "2020-06-01T00:00:00.000000Z"
            }),
        );
        let (store, local) = build(Some(fake));
        local.insert(draft("Guest")).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Guest");
        assert_eq!(listed[1].id, "remote-1");
        assert_eq!(listed[1].status, CandidateStatus::Reviewed);
    }

    #[tokio::test]
    async fn test_remote_read_failure_shows_local_only() {
        let fake = Arc::new(FakeRemote::failing());
        let (store, local) = build(Some(fake));
        local.insert(draft("Guest")).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_status_update_local() {
        let (store, _) = build(None);
        let id = store.create(draft("Linus")).await.unwrap();

        store
            .update_status(&id, CandidateStatus::Shortlisted)
            .await
            .unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed[0].status, CandidateStatus::Shortlisted);
        assert!(listed[0].last_updated() >= listed[0].created_at);
    }

    #[tokio::test]
    async fn test_status_update_unknown_local_id_is_not_found() {
        let (store, _) = build(Some(Arc::new(FakeRemote::new())));
        let err = store
            .update_status("local-404", CandidateStatus::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_status_update_remote() {
        let fake = Arc::new(FakeRemote::new());
        let (store, _) = build(Some(fake.clone()));
        let id = store.create(draft("Remote")).await.unwrap();
        assert!(!is_local_id(&id));

        store.update_status(&id, CandidateStatus::Selected).await.unwrap();
        let row = fake
            .rows("candidates")
            .into_iter()
            .find(|r| r["id"] == id.as_str())
            .unwrap();
        assert_eq!(row["status"], "selected");
    }

    #[tokio::test]
    async fn test_delete_many_splits_by_origin() {
        let fake = Arc::new(FakeRemote::new());
        let (store, local) = build(Some(fake.clone()));
        let remote_id = store.create(draft("Remote")).await.unwrap();
        let local_id = local.insert(draft("Guest")).await.unwrap().id;

        store
            .delete_many(&[remote_id, local_id])
            .await
            .unwrap();

        assert!(fake.rows("candidates").is_empty());
        assert!(local.records().await.unwrap().is_empty());
        let deleted = fake.deleted.lock().unwrap().clone();
        assert_eq!(deleted.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_remote_delete_surfaces() {
        let fake = Arc::new(FakeRemote::new());
        let (store, _) = build(Some(fake.clone()));
        let id = store.create(draft("Remote")).await.unwrap();

        fake.fail_writes.store(true, Ordering::SeqCst);
        assert!(store.delete(&id).await.is_err());
    }

    #[tokio::test]
    async fn test_clear_all_only_clears_guest_entries() {
        let fake = Arc::new(FakeRemote::new());
        let (store, local) = build(Some(fake.clone()));
        store.create(draft("Remote")).await.unwrap();
        local.insert(draft("Guest")).await.unwrap();

        store.clear_all().await.unwrap();

        assert!(local.records().await.unwrap().is_empty());
        assert_eq!(fake.rows("candidates").len(), 1);
    }
}
