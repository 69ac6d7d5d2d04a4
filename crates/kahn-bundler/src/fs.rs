//! Filesystem access
//!
//! The bundler only ever asks two questions of the filesystem: does a
//! regular file exist at a path, and what does it contain. [`OsFileSystem`]
//! answers them from disk; [`MemoryFileSystem`] from a map, for tests and
//! embedding.

use rustc_hash::FxHashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

pub trait FileSystem {
    /// Whether `path` names an existing regular file. Inaccessible paths
    /// are reported as absent.
    fn is_file(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
    fn is_file(&self, path: &Path) -> bool {
        (**self).is_file(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        (**self).read_to_string(path)
    }
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        std::fs::metadata(path)
            .map(|metadata| metadata.is_file())
            .unwrap_or(false)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// An in-memory filesystem keyed by lexically normalized path.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: FxHashMap<PathBuf, String>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, contents: impl Into<String>) {
        self.files
            .insert(normalize(path.as_ref()), contents.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileSystem for MemoryFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize(path))
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(&normalize(path)).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }
}

/// Drop `.` components and fold `..` into its parent where one exists.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_memory_paths_are_normalized() {
        let fs = MemoryFileSystem::new().with_file("./lib/a.js", "a");

        assert!(fs.is_file(Path::new("lib/a.js")));
        assert!(fs.is_file(Path::new("lib/x/../a.js")));
        assert!(!fs.is_file(Path::new("a.js")));
        assert_eq!(fs.read_to_string(Path::new("./lib/./a.js")).unwrap(), "a");
    }

    #[test]
    fn test_memory_missing_file() {
        let fs = MemoryFileSystem::new();
        let err = fs.read_to_string(Path::new("missing.js")).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(fs.is_empty());
    }

    #[test]
    fn test_os_directories_are_not_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("util.js")).unwrap();
        fs::write(temp_dir.path().join("app.js"), "x").unwrap();

        assert!(!OsFileSystem.is_file(&temp_dir.path().join("util.js")));
        assert!(OsFileSystem.is_file(&temp_dir.path().join("app.js")));
        assert!(!OsFileSystem.is_file(&temp_dir.path().join("missing.js")));
    }
}
