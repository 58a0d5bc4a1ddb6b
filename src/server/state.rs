//! Shared application state for the API server

use crate::dataset::{CacheLoad, Dataset, DatasetCache, DatasetError};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state
///
/// Requests read the current snapshot and never mutate it; only an explicit
/// reload swaps in a new `Arc`.
pub struct AppState {
    /// Source file the dataset was loaded from
    pub dataset_path: PathBuf,
    cache: DatasetCache,
    dataset: RwLock<Arc<Dataset>>,
}

impl AppState {
    /// Loads the dataset at `path` through the content-keyed cache.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let cache = DatasetCache::new();
        let loaded = cache.load(path.as_ref())?;
        Ok(AppState {
            dataset_path: path.as_ref().to_path_buf(),
            cache,
            dataset: RwLock::new(loaded.dataset),
        })
    }

    /// Wraps an already-built dataset.
    pub fn from_dataset(dataset: Dataset, dataset_path: impl Into<PathBuf>) -> Self {
        AppState {
            dataset_path: dataset_path.into(),
            cache: DatasetCache::new(),
            dataset: RwLock::new(Arc::new(dataset)),
        }
    }

    /// Current dataset snapshot.
    pub async fn dataset(&self) -> Arc<Dataset> {
        Arc::clone(&*self.dataset.read().await)
    }

    /// Re-reads the source file, replacing the snapshot if its content changed.
    ///
    /// The snapshot write lock is held for the whole reload, so concurrent
    /// reloads run one after another and the served snapshot always matches
    /// the cache entry.
    pub async fn reload(&self) -> Result<CacheLoad, DatasetError> {
        let mut snapshot = self.dataset.write().await;

        let path = self.dataset_path.clone();
        let bytes = tokio::task::spawn_blocking(move || std::fs::read(path))
            .await
            .map_err(|err| DatasetError::Io(io::Error::new(io::ErrorKind::Other, err)))??;

        let loaded = self.cache.load_bytes(&bytes)?;
        if loaded.refreshed {
            tracing::info!(rows = loaded.dataset.len(), "Dataset snapshot replaced");
        }
        *snapshot = Arc::clone(&loaded.dataset);
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "date,startup,vertical,subvertical,city,investors,round,amount";

    fn dataset_file(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_reload_restores_snapshot_matching_cache() {
        let file = dataset_file(&["2020-01-01,X,Fintech,,Mumbai,A,Seed,1"]);
        let state = AppState::load(file.path()).unwrap();

        // A stale snapshot installed behind the cache's back
        *state.dataset.write().await = Arc::new(Dataset::default());

        let loaded = state.reload().await.unwrap();
        assert!(!loaded.refreshed);
        let current = state.dataset().await;
        assert!(Arc::ptr_eq(&current, &loaded.dataset));
        assert_eq!(current.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_reloads_agree_with_cache() {
        let mut file = dataset_file(&["2020-01-01,X,Fintech,,Mumbai,A,Seed,1"]);
        let state = Arc::new(AppState::load(file.path()).unwrap());

        writeln!(file, "2020-02-01,Y,Fintech,,Pune,B,Seed,2").unwrap();
        file.flush().unwrap();

        let (first, second) = tokio::join!(state.reload(), state.reload());
        let refreshed = [first.unwrap().refreshed, second.unwrap().refreshed];
        assert_eq!(refreshed.iter().filter(|r| **r).count(), 1);

        let settled = state.reload().await.unwrap();
        assert!(!settled.refreshed);
        assert!(Arc::ptr_eq(&state.dataset().await, &settled.dataset));
        assert_eq!(settled.dataset.len(), 2);
    }

    #[tokio::test]
    async fn test_reload_of_missing_file_keeps_snapshot() {
        let file = dataset_file(&["2020-01-01,X,Fintech,,Mumbai,A,Seed,1"]);
        let state = AppState::load(file.path()).unwrap();
        let path = file.path().to_path_buf();
        drop(file);
        assert!(!path.exists());

        assert!(matches!(state.reload().await, Err(DatasetError::Io(_))));
        assert_eq!(state.dataset().await.len(), 1);
    }
}
