//! Disk-backed blob store for uploaded CV files.
//!
//! Files are written under generated keys (`cv-<millis>-<random>.<ext>`) inside a single
//! upload directory. The human-facing original name stays on the application record, so
//! the store never needs to trust client-supplied file names as paths.

use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

/// Error raised by the CV store.
#[derive(Debug, thiserror::Error)]
pub enum CvStoreError {
    #[error("stored CV path '{0}' does not name a file inside the upload directory")]
    InvalidKey(String),
    #[error("CV storage i/o failure: {0}")]
    Io(#[from] io::Error),
}

/// Location of a freshly written CV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCv {
    pub key: String,
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct CvStore {
    root: PathBuf,
}

impl CvStore {
    /// Use `root` as the upload directory, creating it when absent.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, CvStoreError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Generate a collision-resistant key that keeps the original extension.
    pub fn generate_key(extension: &str) -> String {
        let random = Uuid::new_v4().simple().to_string();
        format!(
            "cv-{}-{}{}",
            Utc::now().timestamp_millis(),
            &random[..12],
            extension
        )
    }

    /// Write `bytes` under a new key and return where it landed.
    pub async fn put(&self, extension: &str, bytes: &[u8]) -> Result<StoredCv, CvStoreError> {
        let key = Self::generate_key(extension);
        let target = self.root.join(&key);
        let tmp = self.root.join(format!(".{key}.part"));

        write_then_rename(&tmp, &target, bytes).await?;

        debug!(%key, size = bytes.len(), "cv stored");
        Ok(StoredCv {
            path: target.display().to_string(),
            key,
        })
    }

    /// Read a stored CV; `None` when the file is gone.
    pub async fn read(&self, stored_path: &str) -> Result<Option<Vec<u8>>, CvStoreError> {
        let path = self.resolve(stored_path)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Whether a stored CV is currently present.
    pub async fn exists(&self, stored_path: &str) -> Result<bool, CvStoreError> {
        let path = self.resolve(stored_path)?;
        Ok(fs::try_exists(&path).await?)
    }

    /// Remove a stored CV. Returns `false` if it was already gone.
    pub async fn remove(&self, stored_path: &str) -> Result<bool, CvStoreError> {
        let path = self.resolve(stored_path)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "cv removed");
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Map a recorded `cv_path` back to a file inside the upload directory.
    ///
    /// Only the final component is honoured, so records survive a moved upload directory
    /// and cannot point outside of it.
    fn resolve(&self, stored_path: &str) -> Result<PathBuf, CvStoreError> {
        let invalid = || CvStoreError::InvalidKey(stored_path.to_string());
        let key = match Path::new(stored_path).components().next_back() {
            Some(Component::Normal(name)) => name,
            _ => return Err(invalid()),
        };
        let key = key.to_str().ok_or_else(invalid)?;
        if key.starts_with('.') {
            return Err(invalid());
        }
        Ok(self.root.join(key))
    }
}

/// Stage `bytes` at `tmp` and move them onto `target`; the staging file never outlives a failure.
async fn write_then_rename(tmp: &Path, target: &Path, bytes: &[u8]) -> io::Result<()> {
    let written = match fs::write(tmp, bytes).await {
        Ok(()) => fs::rename(tmp, target).await,
        Err(err) => Err(err),
    };
    if written.is_err() {
        let _ = fs::remove_file(tmp).await;
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_keep_extension_and_differ() {
        let first = CvStore::generate_key(".pdf");
        let second = CvStore::generate_key(".pdf");

        assert!(first.starts_with("cv-"));
        assert!(first.ends_with(".pdf"));
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn put_read_and_remove_round_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CvStore::open(dir.path().join("cv")).await.expect("open");

        let stored = store.put(".docx", b"resume").await.expect("put");
        assert!(stored.path.ends_with(&stored.key));
        assert!(store.exists(&stored.path).await.expect("exists"));
        assert_eq!(
            store.read(&stored.path).await.expect("read"),
            Some(b"resume".to_vec())
        );

        assert!(store.remove(&stored.path).await.expect("remove"));
        assert!(!store.remove(&stored.path).await.expect("second remove"));
        assert_eq!(store.read(&stored.path).await.expect("read"), None);
    }

    #[tokio::test]
    async fn failed_rename_removes_the_staging_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tmp = dir.path().join(".cv-1.pdf.part");
        let target = dir.path().join("occupied");
        std::fs::create_dir(&target).expect("target dir");
        std::fs::write(target.join("keep"), b"x").expect("fill target dir");

        assert!(write_then_rename(&tmp, &target, b"resume").await.is_err());
        assert!(!tmp.exists());
    }

    #[tokio::test]
    async fn failed_put_leaves_no_partial_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("cv");
        let store = CvStore::open(&root).await.expect("open");
        std::fs::remove_dir(&root).expect("drop upload dir");

        assert!(matches!(
            store.put(".pdf", b"resume").await,
            Err(CvStoreError::Io(_))
        ));
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn rejects_paths_without_a_file_component() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CvStore::open(dir.path()).await.expect("open");

        for bad in ["", "..", "uploads/..", ".hidden.part"] {
            assert!(matches!(
                store.read(bad).await,
                Err(CvStoreError::InvalidKey(_))
            ));
        }
    }

    #[tokio::test]
    async fn resolves_only_the_file_name_of_recorded_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CvStore::open(dir.path()).await.expect("open");
        let stored = store.put(".pdf", b"cv").await.expect("put");

        let moved = format!("/elsewhere/uploads/{}", stored.key);
        assert_eq!(
            store.read(&moved).await.expect("read"),
            Some(b"cv".to_vec())
        );
    }
}
