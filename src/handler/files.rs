//! File write/read handlers

use crate::http::params::Params;
use crate::logger;
use crate::storage::{FileStore, StorageError};

pub const DEFAULT_NAME: &str = "test.txt";
pub const DEFAULT_CONTENT: &str = "from springboot repo";

/// Append `content` plus a newline to `<base_dir>/<name>`
pub async fn write_file(params: &Params, store: &FileStore) -> Result<String, StorageError> {
    let name = params.get_or("name", DEFAULT_NAME);
    let content = params.get_or("content", DEFAULT_CONTENT);

    let target = store.resolve(name)?;
    store.append(&target, &format!("{content}\n")).await?;

    logger::log_debug(&format!(
        "[Write] {} bytes appended to {}",
        content.len() + 1,
        target.display()
    ));
    Ok(format!("✅ Written to {}", target.display()))
}

/// Return the contents of `<base_dir>/<name>`, or a not-found message.
///
/// `raw_name` is the percent-encoded path segment as received.
pub async fn read_file(raw_name: &str, store: &FileStore) -> Result<String, StorageError> {
    let name = urlencoding::decode(raw_name).map_err(|_| StorageError::InvalidName {
        name: raw_name.to_string(),
        reason: "name is not valid UTF-8",
    })?;

    let target = store.resolve(&name)?;
    match store.read(&target).await? {
        Some(contents) => Ok(contents),
        None => Ok(format!("❌ File not found: {}", target.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let params = Params::from_query(Some("name=notes.txt&content=hello"));
        let msg = write_file(&params, &store).await.unwrap();
        assert_eq!(
            msg,
            format!("✅ Written to {}", dir.path().join("notes.txt").display())
        );

        let contents = read_file("notes.txt", &store).await.unwrap();
        assert_eq!(contents, "hello\n");
    }

    #[tokio::test]
    async fn test_successive_writes_append_in_order() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        for content in ["one", "two", "three"] {
            let query = format!("name=seq.txt&content={content}");
            write_file(&Params::from_query(Some(query.as_str())), &store)
                .await
                .unwrap();
        }

        assert_eq!(
            read_file("seq.txt", &store).await.unwrap(),
            "one\ntwo\nthree\n"
        );
    }

    #[tokio::test]
    async fn test_write_defaults() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        write_file(&Params::default(), &store).await.unwrap();
        write_file(
            &Params::from_query(Some("name=test.txt&content=from+springboot+repo")),
            &store,
        )
        .await
        .unwrap();

        assert_eq!(
            read_file(DEFAULT_NAME, &store).await.unwrap(),
            "from springboot repo\nfrom springboot repo\n"
        );
    }

    #[tokio::test]
    async fn test_read_missing_reports_resolved_path() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let msg = read_file("ghost.txt", &store).await.unwrap();
        assert_eq!(
            msg,
            format!("❌ File not found: {}", dir.path().join("ghost.txt").display())
        );
    }

    #[tokio::test]
    async fn test_read_decodes_percent_encoding() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        std::fs::write(dir.path().join("my file.txt"), "spaced\n").unwrap();

        assert_eq!(
            read_file("my%20file.txt", &store).await.unwrap(),
            "spaced\n"
        );
    }

    #[tokio::test]
    async fn test_traversal_rejected_before_touching_disk() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("base");
        std::fs::create_dir(&base).unwrap();
        let store = FileStore::new(&base);

        let params = Params::from_query(Some("name=..%2Fescaped.txt&content=x"));
        let err = write_file(&params, &store).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidName { .. }));
        assert!(!dir.path().join("escaped.txt").exists());

        std::fs::write(dir.path().join("secret.txt"), "secret\n").unwrap();
        let err = read_file("..%2Fsecret.txt", &store).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidName { .. }));
    }

    #[tokio::test]
    async fn test_invalid_utf8_name_is_rejected() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let err = read_file("%FF%FE", &store).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidName { .. }));
    }
}
