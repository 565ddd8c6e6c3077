//! Subscriber persistence
//!
//! The subscriber set is shared between the chat command task (which adds
//! and removes ids) and the notifier (which reads it). All access goes
//! through one mutex; every change rewrites the whole JSON file.

use crate::error::StoreError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Result of a subscribe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Added,
    AlreadySubscribed,
}

/// Result of an unsubscribe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsubscribeOutcome {
    Removed,
    NotSubscribed,
}

struct Inner {
    path: PathBuf,
    /// Insertion-ordered, no duplicates
    ids: Vec<i64>,
}

/// Cloneable handle to the shared, file-backed subscriber set.
#[derive(Clone)]
pub struct SubscriberStore {
    inner: Arc<Mutex<Inner>>,
}

impl SubscriberStore {
    /// Load the set from `path`. A missing file is an empty set.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let ids = read_ids(&path).await?;
        info!("Loaded {} subscribers from {:?}", ids.len(), path);

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner { path, ids })),
        })
    }

    /// Add a subscriber, persisting on change.
    pub async fn subscribe(&self, id: i64) -> Result<SubscribeOutcome, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.ids.contains(&id) {
            return Ok(SubscribeOutcome::AlreadySubscribed);
        }

        inner.ids.push(id);
        if let Err(e) = write_ids(&inner.path, &inner.ids).await {
            // keep memory and disk in agreement
            inner.ids.pop();
            return Err(e);
        }
        Ok(SubscribeOutcome::Added)
    }

    /// Remove a subscriber, persisting on change.
    pub async fn unsubscribe(&self, id: i64) -> Result<UnsubscribeOutcome, StoreError> {
        let mut inner = self.inner.lock().await;
        let Some(pos) = inner.ids.iter().position(|&s| s == id) else {
            return Ok(UnsubscribeOutcome::NotSubscribed);
        };

        inner.ids.remove(pos);
        if let Err(e) = write_ids(&inner.path, &inner.ids).await {
            inner.ids.insert(pos, id);
            return Err(e);
        }
        Ok(UnsubscribeOutcome::Removed)
    }

    /// Copy of the current set, in subscription order.
    pub async fn snapshot(&self) -> Vec<i64> {
        self.inner.lock().await.ids.clone()
    }
}

/// Read the persisted id list without going through a store.
pub async fn read_ids(path: &Path) -> Result<Vec<i64>, StoreError> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut ids: Vec<i64> = serde_json::from_str(&contents).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    // A hand-edited file may repeat ids
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(*id));
    Ok(ids)
}

/// Replace the file through a sibling temp file so a crash mid-write
/// leaves the previous list intact.
async fn write_ids(path: &Path, ids: &[i64]) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let json = serde_json::to_string(ids).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp = temp_path(path);
    tokio::fs::write(&tmp, json).await.map_err(io_err)?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(io_err(e));
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
