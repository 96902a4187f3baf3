//! File name confinement
//!
//! A client-supplied name is accepted only if it is a single normal path
//! component, so the joined path can never leave the base directory.

use std::path::{Component, Path, PathBuf};

use super::StorageError;

/// Resolve `name` to a path directly inside `base_dir`.
///
/// No filesystem access happens here; rejected names never reach the disk.
///
/// # Examples
/// ```ignore
/// let path = resolve(Path::new("/tmp"), "test.txt")?;
/// assert_eq!(path, PathBuf::from("/tmp/test.txt"));
/// ```
pub fn resolve(base_dir: &Path, name: &str) -> Result<PathBuf, StorageError> {
    if let Some(reason) = rejection_reason(name) {
        return Err(StorageError::InvalidName {
            name: name.to_string(),
            reason,
        });
    }
    Ok(base_dir.join(name))
}

fn rejection_reason(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("name is empty");
    }
    if name.contains('\0') {
        return Some("name contains a NUL byte");
    }
    // Backslash is rejected on every platform so behaviour does not depend on the host.
    if name.contains(['/', '\\']) {
        return Some("name contains a path separator");
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => None,
        (Some(Component::CurDir | Component::ParentDir), _) => Some("name refers to a directory"),
        _ => Some("name is not a single file name"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reject(name: &str) -> bool {
        matches!(
            resolve(Path::new("/tmp"), name),
            Err(StorageError::InvalidName { .. })
        )
    }

    #[test]
    fn test_plain_names_join_base_dir() {
        let path = resolve(Path::new("/tmp"), "test.txt").unwrap();
        assert_eq!(path, PathBuf::from("/tmp/test.txt"));
        assert_eq!(path.display().to_string(), "/tmp/test.txt");

        let path = resolve(Path::new("/var/data"), "notes.v2.log").unwrap();
        assert_eq!(path, PathBuf::from("/var/data/notes.v2.log"));
    }

    #[test]
    fn test_hidden_and_dotted_names_are_files() {
        assert!(!reject(".hidden"));
        assert!(!reject("..."));
        assert!(!reject("a..b"));
    }

    #[test]
    fn test_traversal_is_rejected() {
        assert!(reject(".."));
        assert!(reject("."));
        assert!(reject("../etc/passwd"));
        assert!(reject("../../root/.ssh/authorized_keys"));
        assert!(reject("sub/../../escape.txt"));
        assert!(reject("..\\windows\\win.ini"));
    }

    #[test]
    fn test_absolute_and_nested_paths_are_rejected() {
        assert!(reject("/etc/passwd"));
        assert!(reject("dir/file.txt"));
        assert!(reject("file.txt/"));
    }

    #[test]
    fn test_empty_and_nul_are_rejected() {
        assert!(reject(""));
        assert!(reject("bad\0name"));
    }

    #[test]
    fn test_rejection_carries_name_and_reason() {
        match resolve(Path::new("/tmp"), "../x") {
            Err(StorageError::InvalidName { name, reason }) => {
                assert_eq!(name, "../x");
                assert_eq!(reason, "name contains a path separator");
            }
            other => panic!("expected InvalidName, got {other:?}"),
        }
    }
}
