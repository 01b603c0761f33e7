use std::sync::Arc;

use tracing::info;

use super::{CandidateStore, LocalStore, RecordFeed, RecordStore, RemoteStore, StoredRecord};
use crate::identity::SessionId;
use crate::kv::KeyValueStore;
use crate::models::{AnalysisRecord, DownloadRecord, LocalCandidate};
use crate::remote::RemoteTables;

/// Every record store the service exposes, built once at startup.
#[derive(Clone)]
pub struct Stores {
    pub analyses: Arc<RecordFeed<AnalysisRecord>>,
    pub downloads: Arc<RecordFeed<DownloadRecord>>,
    pub candidates: Arc<RecordFeed<LocalCandidate>>,
    /// Same store as behind `candidates`, for status changes.
    pub candidate_store: Arc<CandidateStore>,
}

/// Chooses each kind's backend once. `remote` is `Some` only when the
/// availability check passed at startup.
pub fn build_stores(
    kv: Arc<dyn KeyValueStore>,
    remote: Option<Arc<dyn RemoteTables>>,
    session: SessionId,
) -> Stores {
    let candidate_store = Arc::new(CandidateStore::new(
        Arc::new(LocalStore::new(kv.clone(), session.clone())),
        remote.clone(),
        session.clone(),
    ));

    info!(
        "Record stores ready ({} backend)",
        if remote.is_some() { "remote" } else { "local" }
    );

    Stores {
        analyses: Arc::new(RecordFeed::new(select_store::<AnalysisRecord>(
            &kv, &remote, &session,
        ))),
        downloads: Arc::new(RecordFeed::new(select_store::<DownloadRecord>(
            &kv, &remote, &session,
        ))),
        candidates: Arc::new(RecordFeed::new(candidate_store.clone())),
        candidate_store,
    }
}

fn select_store<R: StoredRecord>(
    kv: &Arc<dyn KeyValueStore>,
    remote: &Option<Arc<dyn RemoteTables>>,
    session: &SessionId,
) -> Arc<dyn RecordStore<R>> {
    let local = Arc::new(LocalStore::<R>::new(kv.clone(), session.clone()));
    match remote {
        Some(remote) => Arc::new(RemoteStore::new(remote.clone(), local, session.clone()))
            as Arc<dyn RecordStore<R>>,
        None => local as Arc<dyn RecordStore<R>>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;
    use crate::remote::fake::FakeRemote;
    use crate::store::test_support::download;

    #[tokio::test]
    async fn test_local_mode_never_needs_remote() {
        let stores = build_stores(Arc::new(MemoryKv::new()), None, SessionId::from("s"));
        let id = stores.downloads.create(download("report.pdf", 88)).await.unwrap();
        assert!(crate::store::is_local_id(&id));
    }

    #[tokio::test]
    async fn test_remote_mode_routes_to_remote() {
        let fake = Arc::new(FakeRemote::new());
        let stores = build_stores(
            Arc::new(MemoryKv::new()),
            Some(fake.clone() as Arc<dyn RemoteTables>),
            SessionId::from("s"),
        );
        stores.downloads.create(download("report.pdf", 88)).await.unwrap();
        assert_eq!(fake.rows("download_history").len(), 1);
    }
}
