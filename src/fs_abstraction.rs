//! Filesystem abstraction layer for testability
//!
//! Every file hostmerge owns (output list, allow/deny lists, config template) goes
//! through [`FileSystem`], so write failures can be simulated with mockall in tests.

use std::io::{self, Write};
use std::path::Path;

#[cfg(test)]
use mockall::automock;

/// Permissions of files consumed by other services (resolvers, ad blockers)
#[cfg(unix)]
const SHARED_FILE_MODE: u32 = 0o644;

/// Trait abstracting the filesystem operations hostmerge needs.
///
/// # Example (testing)
/// ```ignore
/// use hostmerge::fs_abstraction::MockFileSystem;
///
/// let mut mock_fs = MockFileSystem::new();
/// mock_fs.expect_write_atomic()
///     .returning(|_, _| Err(std::io::Error::other("disk full")));
/// ```
#[cfg_attr(test, automock)]
pub trait FileSystem: Send + Sync {
    /// Read file contents as bytes.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Read file contents as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Replace `path` with `contents` via a temporary sibling file and rename.
    ///
    /// Readers either see the old file or the complete new one.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// Real filesystem implementation using std::fs.
#[derive(Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let parent = parent_dir(path);
        let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;

        temp_file.write_all(contents)?;
        temp_file.as_file().sync_all()?;

        // NamedTempFile is created 0600; the merged list must stay readable by the resolver
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp_file
                .as_file()
                .set_permissions(std::fs::Permissions::from_mode(SHARED_FILE_MODE))?;
        }

        temp_file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Directory holding `path`, `.` for bare file names.
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

static REAL_FS: RealFileSystem = RealFileSystem;

/// Get a reference to the global real filesystem instance.
pub fn real_fs() -> &'static RealFileSystem {
    &REAL_FS
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("hosts.txt");

        let fs = RealFileSystem;
        fs.write_atomic(&file_path, b"0.0.0.0 ads.example.com").unwrap();

        assert_eq!(
            fs.read_to_string(&file_path).unwrap(),
            "0.0.0.0 ads.example.com"
        );
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("hosts.txt");

        let fs = RealFileSystem;
        fs.write_atomic(&file_path, b"a much longer previous content").unwrap();
        fs.write_atomic(&file_path, b"short").unwrap();

        assert_eq!(fs.read(&file_path).unwrap(), b"short");
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("hosts.txt");

        RealFileSystem.write_atomic(&file_path, b"data").unwrap();

        let names: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("hosts.txt")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("hosts.txt");
        RealFileSystem.write_atomic(&file_path, b"data").unwrap();

        let mode = std::fs::metadata(&file_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, SHARED_FILE_MODE);
    }

    #[test]
    fn test_write_atomic_missing_dir_fails() {
        let result = RealFileSystem.write_atomic(Path::new("/nonexistent/dir/hosts.txt"), b"x");
        assert!(result.is_err());
    }

    #[test]
    fn test_create_dir_all_and_exists() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a/b/c");
        let fs = real_fs();

        assert!(!fs.exists(&nested));
        fs.create_dir_all(&nested).unwrap();
        assert!(fs.exists(&nested));
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("hosts.txt")), Path::new("."));
        assert_eq!(parent_dir(Path::new("out/hosts.txt")), Path::new("out"));
        assert_eq!(parent_dir(Path::new("/srv/hosts.txt")), Path::new("/srv"));
    }

    #[test]
    fn test_read_nonexistent() {
        let result = RealFileSystem.read_to_string(Path::new("/nonexistent/path/file.txt"));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_mock_fs_error_simulation() {
        let mut mock = MockFileSystem::new();
        mock.expect_write_atomic()
            .returning(|_, _| Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only")));

        let result = mock.write_atomic(Path::new("/any/path"), b"data");
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_real_fs_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RealFileSystem>();
    }
}
