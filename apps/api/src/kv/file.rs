use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{KeyValueStore, KvError};

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a sibling temp file first and are renamed into place, so a crash
/// mid-write leaves the previous value intact.
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    /// Creates the data directory if it does not exist yet.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, KvError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        debug!("Local file store at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

#[async_trait]
impl KeyValueStore for FileKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), KvError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKv::open(dir.path()).await.unwrap();
        assert_eq!(kv.get("resume_analyzer_download_history").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_value_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let kv = FileKv::open(dir.path()).await.unwrap();
            kv.set("resume_analyzer_session_id", "abc").await.unwrap();
        }
        let kv = FileKv::open(dir.path()).await.unwrap();
        assert_eq!(
            kv.get("resume_analyzer_session_id").await.unwrap().as_deref(),
            Some("abc")
        );
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKv::open(dir.path()).await.unwrap();
        kv.set("k", "v").await.unwrap();
        kv.remove("k").await.unwrap();
        kv.remove("k").await.unwrap();
        assert_eq!(kv.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_open_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let kv = FileKv::open(&nested).await.unwrap();
        assert!(kv.dir().is_dir());
    }

    #[test]
    fn test_key_is_sanitized_into_file_name() {
        let kv = FileKv {
            dir: PathBuf::from("/data"),
        };
        assert_eq!(kv.path_for("../evil key"), PathBuf::from("/data/___evil_key.json"));
    }
}
