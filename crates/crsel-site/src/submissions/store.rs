use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::domain::{Record, RecordId};

/// Storage abstraction so the services can run against memory in tests and disk in production.
pub trait RecordStore<T: Record>: Send + Sync {
    fn insert(&self, draft: T::Draft) -> impl Future<Output = Result<T, StoreError>> + Send;
    fn find(&self, id: &RecordId) -> impl Future<Output = Result<Option<T>, StoreError>> + Send;
    /// All records, most recently created first.
    fn newest_first(&self) -> impl Future<Output = Result<Vec<T>, StoreError>> + Send;
    /// Apply `change` to the record with `id` under the store lock and return the result.
    fn update(
        &self,
        id: &RecordId,
        change: &(dyn Fn(&mut T) + Sync),
    ) -> impl Future<Output = Result<Option<T>, StoreError>> + Send;
    fn remove(&self, id: &RecordId)
        -> impl Future<Output = Result<Option<T>, StoreError>> + Send;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("failed to persist collection {collection}: {source}")]
    Persist {
        collection: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("collection {collection} is corrupt: {source}")]
    Corrupt {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Collection kept in insertion order, optionally mirrored to a JSON file.
///
/// Every mutation rewrites the whole file through a temporary sibling and a rename so a
/// crash mid-write leaves the previous snapshot intact. File IO goes through `tokio::fs`
/// and the lock is async, so a slow disk parks the request instead of a worker thread.
#[derive(Debug)]
pub struct DocumentStore<T> {
    records: Mutex<Vec<T>>,
    file: Option<PathBuf>,
}

impl<T: Record> Default for DocumentStore<T> {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<T: Record> DocumentStore<T> {
    pub fn in_memory() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            file: None,
        }
    }

    /// Open (or start) the collection file `<dir>/<collection>.json`, creating `dir` if needed.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .await
            .map_err(persist_error::<T>)?;
        Self::load(dir).await
    }

    /// Open the collection in an existing directory without creating anything.
    ///
    /// A missing directory is an error; a missing collection file reads as empty.
    pub async fn open_existing(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        let metadata = fs::metadata(dir)
            .await
            .map_err(persist_error::<T>)?;
        if !metadata.is_dir() {
            return Err(persist_error::<T>(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", dir.display()),
            )));
        }
        Self::load(dir).await
    }

    async fn load(dir: &Path) -> Result<Self, StoreError> {
        let file = dir.join(format!("{}.json", T::COLLECTION));
        let records = match fs::read(&file).await {
            Ok(raw) if raw.is_empty() => Vec::new(),
            Ok(raw) => serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
                collection: T::COLLECTION,
                source,
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(persist_error::<T>(source)),
        };

        debug!(
            collection = T::COLLECTION,
            count = records.len(),
            path = %file.display(),
            "collection loaded"
        );

        Ok(Self {
            records: Mutex::new(records),
            file: Some(file),
        })
    }

    /// Caller holds the lock, so snapshots reach the disk in mutation order.
    async fn persist(&self, records: &[T]) -> Result<(), StoreError> {
        let Some(file) = &self.file else {
            return Ok(());
        };

        let payload = serde_json::to_vec_pretty(records).map_err(|source| StoreError::Corrupt {
            collection: T::COLLECTION,
            source,
        })?;
        let tmp = file.with_extension("json.tmp");
        let written = match fs::write(&tmp, payload).await {
            Ok(()) => fs::rename(&tmp, file).await,
            Err(err) => Err(err),
        };
        if let Err(source) = written {
            let _ = fs::remove_file(&tmp).await;
            return Err(persist_error::<T>(source));
        }
        Ok(())
    }
}

fn persist_error<T: Record>(source: io::Error) -> StoreError {
    StoreError::Persist {
        collection: T::COLLECTION,
        source,
    }
}

impl<T: Record> RecordStore<T> for DocumentStore<T> {
    async fn insert(&self, draft: T::Draft) -> Result<T, StoreError> {
        let record = T::create(RecordId::generate(), Utc::now(), draft);
        let mut guard = self.records.lock().await;
        guard.push(record.clone());
        if let Err(err) = self.persist(&guard).await {
            guard.pop();
            return Err(err);
        }
        Ok(record)
    }

    async fn find(&self, id: &RecordId) -> Result<Option<T>, StoreError> {
        let guard = self.records.lock().await;
        Ok(guard.iter().find(|record| record.id() == id).cloned())
    }

    async fn newest_first(&self) -> Result<Vec<T>, StoreError> {
        let guard = self.records.lock().await;
        let mut records: Vec<T> = guard.iter().rev().cloned().collect();
        drop(guard);
        // stable: equal timestamps keep latest-inserted first
        records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(records)
    }

    async fn update(
        &self,
        id: &RecordId,
        change: &(dyn Fn(&mut T) + Sync),
    ) -> Result<Option<T>, StoreError> {
        let mut guard = self.records.lock().await;
        let Some(index) = guard.iter().position(|record| record.id() == id) else {
            return Ok(None);
        };

        let previous = guard[index].clone();
        change(&mut guard[index]);
        let updated = guard[index].clone();
        if let Err(err) = self.persist(&guard).await {
            guard[index] = previous;
            return Err(err);
        }
        Ok(Some(updated))
    }

    async fn remove(&self, id: &RecordId) -> Result<Option<T>, StoreError> {
        let mut guard = self.records.lock().await;
        let Some(index) = guard.iter().position(|record| record.id() == id) else {
            return Ok(None);
        };

        let removed = guard.remove(index);
        if let Err(err) = self.persist(&guard).await {
            guard.insert(index, removed);
            return Err(err);
        }
        Ok(Some(removed))
    }
}
