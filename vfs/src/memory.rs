use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::VfsError;
use crate::provider::{VfsFile, VfsProvider};

/// In-memory provider for tests and embedded meshes.
///
/// Thread-safe and mutable even after being mounted in a [`Vfs`](crate::Vfs).
/// File contents are shared: opening a file hands out a cursor over the
/// stored bytes without copying them.
///
/// Directories are implicit; they exist whenever a file path contains
/// that directory prefix.
///
/// # Example
///
/// ```ignore
/// let mem = MemoryProvider::new();
/// mem.insert("meshes/bunny.serialized", bunny_bytes);
///
/// let mut vfs = Vfs::new();
/// vfs.mount("builtin", mem);
/// ```
#[derive(Clone, Default)]
pub struct MemoryProvider {
    files: Arc<RwLock<HashMap<String, Arc<[u8]>>>>,
}

/// Cursor over shared file bytes.
struct SharedBytes(Arc<[u8]>);

impl AsRef<[u8]> for SharedBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl MemoryProvider {
    /// Create an empty in-memory provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file at the given path.
    ///
    /// The path should use forward slashes and have no leading slash.
    /// Overwrites any existing file at the same path. Open handles keep
    /// reading the old contents.
    pub fn insert(&self, path: impl Into<String>, data: impl Into<Arc<[u8]>>) {
        self.files.write().insert(path.into(), data.into());
    }

    /// Remove a file at the given path, returning its data if it existed.
    pub fn remove(&self, path: &str) -> Option<Arc<[u8]>> {
        self.files.write().remove(path)
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl VfsProvider for MemoryProvider {
    fn open(&self, path: &str) -> Result<Box<dyn VfsFile>, VfsError> {
        let data = self
            .files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| VfsError::NotFound(path.to_owned()))?;
        Ok(Box::new(Cursor::new(SharedBytes(data))))
    }

    fn exists(&self, path: &str) -> Result<bool, VfsError> {
        Ok(self.files.read().contains_key(path))
    }

    fn list_dir(&self, path: &str) -> Result<Vec<String>, VfsError> {
        let map = self.files.read();
        let mut children = HashSet::new();

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{path}/")
        };

        for key in map.keys() {
            if let Some(rest) = key.strip_prefix(&prefix) {
                // Immediate child name (first segment)
                let child = match rest.find('/') {
                    Some(pos) => &rest[..pos],
                    None => rest,
                };
                if !child.is_empty() {
                    children.insert(child.to_owned());
                }
            }
        }

        let mut result: Vec<String> = children.into_iter().collect();
        result.sort();
        Ok(result)
    }

    fn describe(&self, path: &str) -> String {
        format!("memory:{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek, SeekFrom};

    #[test]
    fn open_existing_file() {
        let mem = MemoryProvider::new();
        mem.insert("mesh.serialized", b"\x1c\x04\x04\x00".to_vec());
        let mut file = mem.open("mesh.serialized").unwrap();
        let mut data = Vec::new();
        file.read_to_end(&mut data).unwrap();
        assert_eq!(data, b"\x1c\x04\x04\x00");
    }

    #[test]
    fn handles_are_seekable() {
        let mem = MemoryProvider::new();
        mem.insert("mesh.serialized", (0u8..16).collect::<Vec<_>>());
        let mut file = mem.open("mesh.serialized").unwrap();

        assert_eq!(file.seek(SeekFrom::End(-4)).unwrap(), 12);
        let mut tail = [0u8; 4];
        file.read_exact(&mut tail).unwrap();
        assert_eq!(tail, [12, 13, 14, 15]);
    }

    #[test]
    fn open_missing_file() {
        let mem = MemoryProvider::new();
        let result = mem.open("nope.serialized");
        assert!(matches!(result, Err(VfsError::NotFound(_))));
    }

    #[test]
    fn open_handle_survives_overwrite() {
        let mem = MemoryProvider::new();
        mem.insert("a", b"old".to_vec());
        let mut file = mem.open("a").unwrap();
        mem.insert("a", b"new".to_vec());

        let mut data = Vec::new();
        file.read_to_end(&mut data).unwrap();
        assert_eq!(data, b"old");
    }

    #[test]
    fn exists_check() {
        let mem = MemoryProvider::new();
        mem.insert("scene.serialized", b"".to_vec());
        assert!(mem.exists("scene.serialized").unwrap());
        assert!(!mem.exists("nope.serialized").unwrap());
    }

    #[test]
    fn list_dir_root() {
        let mem = MemoryProvider::new();
        mem.insert("a.serialized", b"".to_vec());
        mem.insert("b/c.serialized", b"".to_vec());
        mem.insert("b/d.serialized", b"".to_vec());

        let entries = mem.list_dir("").unwrap();
        assert_eq!(entries, vec!["a.serialized", "b"]);
    }

    #[test]
    fn list_dir_nested() {
        let mem = MemoryProvider::new();
        mem.insert("dir/a.serialized", b"".to_vec());
        mem.insert("dir/sub/b.serialized", b"".to_vec());

        let entries = mem.list_dir("dir").unwrap();
        assert_eq!(entries, vec!["a.serialized", "sub"]);
    }

    #[test]
    fn list_dir_empty() {
        let mem = MemoryProvider::new();
        assert!(mem.list_dir("nonexistent").unwrap().is_empty());
    }

    #[test]
    fn remove_returns_data() {
        let mem = MemoryProvider::new();
        mem.insert("scene.serialized", b"data".to_vec());
        assert_eq!(mem.len(), 1);
        let data = mem.remove("scene.serialized");
        assert_eq!(data.as_deref(), Some(&b"data"[..]));
        assert!(mem.remove("scene.serialized").is_none());
        assert!(mem.is_empty());
    }
}
