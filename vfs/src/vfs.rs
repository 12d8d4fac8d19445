use std::collections::HashMap;
use std::sync::Arc;

use crate::error::VfsError;
use crate::path;
use crate::provider::{VfsFile, VfsProvider};

/// Virtual file system that routes paths to mounted providers.
///
/// Paths are structured as `"source_name/rest/of/path"`. The first path
/// segment selects the provider. If no source name matches, the default
/// source (if set) is tried with the full path.
///
/// `Clone` is cheap (Arc internals). Thread-safe (`Send + Sync`).
///
/// # Example
///
/// ```ignore
/// let mut vfs = Vfs::new();
/// vfs.mount("scene", FileSystemProvider::new("./scenes/cbox"));
/// vfs.mount("builtin", MemoryProvider::new());
/// vfs.set_default("scene");
///
/// // Opens ./scenes/cbox/meshes/bunny.serialized
/// let file = vfs.open("scene/meshes/bunny.serialized")?;
///
/// // With a default source, bare paths resolve there as well:
/// let file = vfs.open("meshes/bunny.serialized")?;
/// ```
#[derive(Clone)]
pub struct Vfs {
    inner: Arc<VfsInner>,
}

struct VfsInner {
    sources: HashMap<String, Box<dyn VfsProvider>>,
    default_source: Option<String>,
}

impl Vfs {
    /// Create an empty VFS with no mounted sources.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(VfsInner {
                sources: HashMap::new(),
                default_source: None,
            }),
        }
    }

    /// Mount a provider under the given source name.
    ///
    /// Replaces any previously mounted provider with the same name.
    ///
    /// # Panics
    ///
    /// Panics if the `Vfs` has already been cloned. All mounting must
    /// happen during the configuration phase before sharing the `Vfs`.
    pub fn mount(&mut self, name: impl Into<String>, provider: impl VfsProvider) {
        let inner = Arc::get_mut(&mut self.inner).expect("cannot mount after Vfs has been cloned");
        inner.sources.insert(name.into(), Box::new(provider));
    }

    /// Set the default source name used when a path does not match any mount.
    ///
    /// # Panics
    ///
    /// Panics if the `Vfs` has already been cloned.
    pub fn set_default(&mut self, name: impl Into<String>) {
        let inner =
            Arc::get_mut(&mut self.inner).expect("cannot set default after Vfs has been cloned");
        inner.default_source = Some(name.into());
    }

    /// Open a file for reading.
    ///
    /// The first path segment selects the source provider. Falls back
    /// to the default source if no mount matches.
    pub fn open(&self, raw_path: &str) -> Result<Box<dyn VfsFile>, VfsError> {
        let (provider, resolved_path) = self.resolve(raw_path)?;
        log::debug!("resolving {raw_path} to {}", provider.describe(&resolved_path));
        provider.open(&resolved_path)
    }

    /// Check whether a file exists.
    pub fn exists(&self, raw_path: &str) -> Result<bool, VfsError> {
        let (provider, resolved_path) = self.resolve(raw_path)?;
        provider.exists(&resolved_path)
    }

    /// List the immediate children of a directory.
    pub fn list_dir(&self, raw_path: &str) -> Result<Vec<String>, VfsError> {
        let (provider, resolved_path) = self.resolve(raw_path)?;
        provider.list_dir(&resolved_path)
    }

    /// Human-readable location a path resolves to.
    pub fn describe(&self, raw_path: &str) -> Result<String, VfsError> {
        let (provider, resolved_path) = self.resolve(raw_path)?;
        Ok(provider.describe(&resolved_path))
    }

    /// Resolve a raw path to a provider reference and the path within that provider.
    fn resolve(&self, raw_path: &str) -> Result<(&dyn VfsProvider, String), VfsError> {
        let normalized = path::normalize(raw_path)?;
        let (source, rest) = path::split_source(&normalized);

        // Try matching the first segment as a source name
        if let Some(provider) = self.inner.sources.get(source) {
            return Ok((provider.as_ref(), rest.to_owned()));
        }

        // Fall back to default source with the full path
        if let Some(default_name) = &self.inner.default_source
            && let Some(provider) = self.inner.sources.get(default_name)
        {
            return Ok((provider.as_ref(), normalized));
        }

        Err(VfsError::NoSuchSource(source.to_owned()))
    }
}

impl Default for Vfs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryProvider;
    use std::io::Read;

    fn read_all(vfs: &Vfs, path: &str) -> Result<Vec<u8>, VfsError> {
        let mut file = vfs.open(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    #[test]
    fn mount_and_open() {
        let mem = MemoryProvider::new();
        mem.insert("bunny.serialized", b"bunny".to_vec());

        let mut vfs = Vfs::new();
        vfs.mount("meshes", mem);

        assert_eq!(read_all(&vfs, "meshes/bunny.serialized").unwrap(), b"bunny");
    }

    #[test]
    fn default_source_fallback() {
        let mem = MemoryProvider::new();
        mem.insert("bunny.serialized", b"bunny".to_vec());

        let mut vfs = Vfs::new();
        vfs.mount("meshes", mem);
        vfs.set_default("meshes");

        // "bunny.serialized" doesn't match any source, falls back to "meshes"
        assert_eq!(read_all(&vfs, "bunny.serialized").unwrap(), b"bunny");
    }

    #[test]
    fn no_source_error() {
        let vfs = Vfs::new();
        let result = vfs.open("unknown/scene.serialized");
        assert!(matches!(result, Err(VfsError::NoSuchSource(s)) if s == "unknown"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let mut vfs = Vfs::new();
        vfs.mount("m", MemoryProvider::new());
        assert!(matches!(
            vfs.open("m/nope.serialized"),
            Err(VfsError::NotFound(_))
        ));
    }

    #[test]
    fn path_normalization() {
        let mem = MemoryProvider::new();
        mem.insert("a/b.serialized", b"ok".to_vec());

        let mut vfs = Vfs::new();
        vfs.mount("data", mem);

        assert_eq!(read_all(&vfs, "data//a/./b.serialized").unwrap(), b"ok");
        assert_eq!(read_all(&vfs, "\\data\\a\\b.serialized").unwrap(), b"ok");
    }

    #[test]
    fn invalid_path_rejected() {
        let mut vfs = Vfs::new();
        vfs.mount("data", MemoryProvider::new());

        let result = vfs.open("data/../secret.serialized");
        assert!(matches!(result, Err(VfsError::InvalidPath(_))));
    }

    #[test]
    fn exists_via_vfs() {
        let mem = MemoryProvider::new();
        mem.insert("scene.serialized", b"".to_vec());

        let mut vfs = Vfs::new();
        vfs.mount("m", mem);

        assert!(vfs.exists("m/scene.serialized").unwrap());
        assert!(!vfs.exists("m/nope.serialized").unwrap());
    }

    #[test]
    fn list_dir_via_vfs() {
        let mem = MemoryProvider::new();
        mem.insert("a.serialized", b"".to_vec());
        mem.insert("sub/b.serialized", b"".to_vec());

        let mut vfs = Vfs::new();
        vfs.mount("m", mem);

        assert_eq!(vfs.list_dir("m").unwrap(), vec!["a.serialized", "sub"]);
    }

    #[test]
    fn describe_via_vfs() {
        let mut vfs = Vfs::new();
        vfs.mount("m", MemoryProvider::new());
        assert_eq!(vfs.describe("m/x.serialized").unwrap(), "memory:x.serialized");
    }

    #[test]
    fn multiple_sources() {
        let mem1 = MemoryProvider::new();
        mem1.insert("a.serialized", b"from_1".to_vec());

        let mem2 = MemoryProvider::new();
        mem2.insert("b.serialized", b"from_2".to_vec());

        let mut vfs = Vfs::new();
        vfs.mount("src1", mem1);
        vfs.mount("src2", mem2);

        assert_eq!(read_all(&vfs, "src1/a.serialized").unwrap(), b"from_1");
        assert_eq!(read_all(&vfs, "src2/b.serialized").unwrap(), b"from_2");
    }

    #[test]
    fn provider_stays_mutable_after_mount() {
        let mem = MemoryProvider::new();
        let mut vfs = Vfs::new();
        vfs.mount("m", mem.clone());

        let shared = vfs.clone();
        mem.insert("late.serialized", b"late".to_vec());
        assert!(shared.exists("m/late.serialized").unwrap());
    }
}
