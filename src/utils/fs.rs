//! File system utilities

use std::path::Path;

/// Returns true when `path` is a directory that already contains entries
///
/// A missing path, a plain file or an unreadable directory all count as
/// "not a non-empty directory"; the clone itself reports those cases.
pub fn is_non_empty_dir(path: &Path) -> bool {
    match std::fs::read_dir(path) {
        Ok(mut entries) => entries.next().is_some(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_path_is_not_non_empty() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!is_non_empty_dir(&temp_dir.path().join("missing")));
    }

    #[test]
    fn test_empty_dir_is_not_non_empty() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!is_non_empty_dir(temp_dir.path()));
    }

    #[test]
    fn test_dir_with_file_is_non_empty() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("README.md"), "hello").unwrap();
        assert!(is_non_empty_dir(temp_dir.path()));
    }

    #[test]
    fn test_plain_file_is_not_non_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file");
        std::fs::write(&file, "x").unwrap();
        assert!(!is_non_empty_dir(&file));
    }
}
