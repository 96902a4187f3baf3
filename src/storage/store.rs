//! File store
//!
//! Appends and reads whole text files. Operations on the same path are
//! serialized through a per-path async mutex, so concurrent appends never
//! interleave and a read never observes half of an append. Different paths
//! proceed in parallel. A path's mutex lives in the lock map only while
//! some operation holds or waits on it.

use dashmap::DashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{path, StorageError};

/// Text file store rooted at a base directory
pub struct FileStore {
    base_dir: PathBuf,
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            locks: DashMap::new(),
        }
    }

    /// Resolve a client-supplied name to a path inside the base directory
    pub fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        path::resolve(&self.base_dir, name)
    }

    /// Append `text` to `path`, creating the file if it does not exist.
    ///
    /// Existing content is never truncated.
    pub async fn append(&self, path: &Path, text: &str) -> Result<(), StorageError> {
        let _guard = self.lock_path(path).await;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| StorageError::io(path, e))?;

        file.write_all(text.as_bytes())
            .await
            .map_err(|e| StorageError::io(path, e))?;
        file.flush().await.map_err(|e| StorageError::io(path, e))
    }

    /// Read the full contents of `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub async fn read(&self, path: &Path) -> Result<Option<String>, StorageError> {
        let _guard = self.lock_path(path).await;

        match fs::read_to_string(path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    /// Wait for exclusive access to `path`.
    ///
    /// The map entry is released before awaiting the mutex.
    async fn lock_path<'a>(&'a self, path: &'a Path) -> PathGuard<'a> {
        let lock = self
            .locks
            .entry(path.to_path_buf())
            .or_default()
            .value()
            .clone();
        PathGuard {
            locks: &self.locks,
            path,
            guard: Some(lock.lock_owned().await),
        }
    }
}

/// Exclusive access to one path; drops its lock map entry when unused
struct PathGuard<'a> {
    locks: &'a DashMap<PathBuf, Arc<Mutex<()>>>,
    path: &'a Path,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        // Release our Arc first so only the map's reference can remain
        drop(self.guard.take());
        self.locks
            .remove_if(self.path, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_append_creates_then_extends() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let path = store.resolve("log.txt").unwrap();

        store.append(&path, "first\n").await.unwrap();
        store.append(&path, "second\n").await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[tokio::test]
    async fn test_append_preserves_existing_content() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let path = dir.path().join("existing.txt");
        std::fs::write(&path, "already here\n").unwrap();

        store.append(&path, "more\n").await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "already here\nmore\n"
        );
    }

    #[tokio::test]
    async fn test_read_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let path = store.resolve("never-written.txt").unwrap();

        assert!(store.read(&path).await.unwrap().is_none());
        // Reading must not create the file
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_read_returns_full_contents() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let path = store.resolve("data.txt").unwrap();
        store.append(&path, "héllo ✅\n").await.unwrap();

        assert_eq!(
            store.read(&path).await.unwrap().as_deref(),
            Some("héllo ✅\n")
        );
    }

    #[tokio::test]
    async fn test_append_into_missing_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("does-not-exist"));
        let path = store.resolve("file.txt").unwrap();

        let err = store.append(&path, "x\n").await.unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }

    #[tokio::test]
    async fn test_read_directory_is_io_error() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let store = FileStore::new(dir.path());
        let path = store.resolve("sub").unwrap();

        let err = store.read(&path).await.unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_do_not_interleave() {
        let dir = tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()));
        let path = store.resolve("shared.txt").unwrap();

        let mut tasks = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            let path = path.clone();
            tasks.push(tokio::spawn(async move {
                let line = format!("{}\n", i.to_string().repeat(512));
                store.append(&path, &line).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let contents = store.read(&path).await.unwrap().unwrap();
        let mut lines: Vec<String> = contents.lines().map(str::to_string).collect();
        let mut expected: Vec<String> = (0..32).map(|i| i.to_string().repeat(512)).collect();
        lines.sort();
        expected.sort();
        assert_eq!(lines, expected);
    }

    #[tokio::test]
    async fn test_lock_map_empties_after_operations() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        for i in 0..500 {
            let missing = store.resolve(&format!("missing-{i}.txt")).unwrap();
            assert!(store.read(&missing).await.unwrap().is_none());
        }
        for i in 0..50 {
            let path = store.resolve(&format!("written-{i}.txt")).unwrap();
            store.append(&path, "x\n").await.unwrap();
            store.read(&path).await.unwrap();
        }

        assert_eq!(store.locks.len(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_lock_map_empties_after_contention() {
        let dir = tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()));
        let path = store.resolve("busy.txt").unwrap();

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            let path = path.clone();
            tasks.push(tokio::spawn(async move {
                for _ in 0..20 {
                    store.append(&path, "line\n").await.unwrap();
                    store.read(&path).await.unwrap();
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.locks.len(), 0);
        let contents = store.read(&path).await.unwrap().unwrap();
        assert_eq!(contents.lines().count(), 16 * 20);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reads_never_see_partial_appends() {
        const LINE_LEN: usize = 64 * 1024;
        const WRITERS: usize = 4;
        const LINES_PER_WRITER: usize = 16;

        let dir = tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()));
        let path = store.resolve("big.txt").unwrap();

        let mut writers = Vec::new();
        for w in 0..WRITERS {
            let store = Arc::clone(&store);
            let path = path.clone();
            writers.push(tokio::spawn(async move {
                let fill = char::from(b'a' + u8::try_from(w).unwrap());
                let line = format!("{}\n", fill.to_string().repeat(LINE_LEN));
                for _ in 0..LINES_PER_WRITER {
                    store.append(&path, &line).await.unwrap();
                }
            }));
        }

        let mut readers = Vec::new();
        for _ in 0..4 {
            let store = Arc::clone(&store);
            let path = path.clone();
            readers.push(tokio::spawn(async move {
                for _ in 0..50 {
                    let Some(contents) = store.read(&path).await.unwrap() else {
                        continue;
                    };
                    assert!(contents.is_empty() || contents.ends_with('\n'));
                    for line in contents.lines() {
                        assert_eq!(line.len(), LINE_LEN);
                        let first = line.as_bytes()[0];
                        assert!(line.bytes().all(|b| b == first));
                    }
                    tokio::task::yield_now().await;
                }
            }));
        }

        for task in writers.into_iter().chain(readers) {
            task.await.unwrap();
        }

        let contents = store.read(&path).await.unwrap().unwrap();
        assert_eq!(contents.lines().count(), WRITERS * LINES_PER_WRITER);
    }
}
