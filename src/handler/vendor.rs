//! Vendor library smoke test
//!
//! Appends a fixed marker line to a fixed file on every call; only the
//! observable file effect and the reply string are kept.

use std::path::Path;

use crate::logger;
use crate::storage::{FileStore, StorageError};

pub const VENDOR_MARKER: &str = "Actimize JAR (system scope) WORKS! ✅";
pub const VENDOR_REPLY: &str = "✅ Actimize JAR loaded via system scope + Docker lib/";

/// Append the marker (no trailing newline) to `vendor_file`
pub async fn test_vendor(store: &FileStore, vendor_file: &Path) -> Result<String, StorageError> {
    store.append(vendor_file, VENDOR_MARKER).await?;
    logger::log_debug(&format!("[Vendor] Marker appended to {}", vendor_file.display()));
    Ok(VENDOR_REPLY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_each_call_appends_one_marker() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let vendor_file = dir.path().join("actimize-test.txt");

        for _ in 0..3 {
            assert_eq!(
                test_vendor(&store, &vendor_file).await.unwrap(),
                VENDOR_REPLY
            );
        }

        let contents = std::fs::read_to_string(&vendor_file).unwrap();
        assert_eq!(contents, VENDOR_MARKER.repeat(3));
        assert_eq!(contents.matches(VENDOR_MARKER).count(), 3);
    }

    #[tokio::test]
    async fn test_unwritable_location_is_io_error() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let vendor_file = dir.path().join("missing-dir").join("actimize-test.txt");

        let err = test_vendor(&store, &vendor_file).await.unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }
}
