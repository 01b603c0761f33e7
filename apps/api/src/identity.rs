use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OnceCell};
use tracing::info;
use uuid::Uuid;

use crate::kv::{KeyValueStore, KvError};

/// Local key the session identifier is persisted under.
pub const SESSION_KEY: &str = "resume_analyzer_session_id";

/// Opaque token scoping guest records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Issues the stable anonymous session identifier for this installation.
///
/// The first call reads the stored value or mints and writes a new one; later
/// calls return the memoized value. The check-then-write runs under a lock so
/// concurrent first callers agree on a single identifier.
pub struct SessionProvider {
    kv: Arc<dyn KeyValueStore>,
    cached: OnceCell<SessionId>,
    mint_lock: Mutex<()>,
}

impl SessionProvider {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            cached: OnceCell::new(),
            mint_lock: Mutex::new(()),
        }
    }

    pub async fn get_session_id(&self) -> Result<SessionId, KvError> {
        if let Some(id) = self.cached.get() {
            return Ok(id.clone());
        }

        let _guard = self.mint_lock.lock().await;
        if let Some(id) = self.cached.get() {
            return Ok(id.clone());
        }

        let id = match self.kv.get(SESSION_KEY).await? {
            Some(existing) if !existing.trim().is_empty() => SessionId(existing),
            _ => {
                let fresh = SessionId(Uuid::new_v4().to_string());
                self.kv.set(SESSION_KEY, fresh.as_str()).await?;
                info!("Issued new session id {fresh}");
                fresh
            }
        };

        // Only reachable under the lock with the cell empty.
        let _ = self.cached.set(id.clone());
        Ok(id)
    }
}
