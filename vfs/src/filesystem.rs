use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use crate::VfsError;
use crate::provider::{VfsFile, VfsProvider};

/// File system provider searching one or more root directories.
///
/// A VFS path is joined with each root in turn; the first root containing
/// the file wins. This mirrors a renderer's search path, where scene files
/// name meshes relative to the scene directory or a shared library folder.
///
/// Path traversal is prevented by the VFS path normalization which rejects
/// `..` segments before they reach the provider.
///
/// # Example
///
/// ```ignore
/// let mut vfs = Vfs::new();
/// vfs.mount(
///     "scene",
///     FileSystemProvider::new("./scenes/cbox").with_root("./shared/meshes"),
/// );
///
/// // Opens ./scenes/cbox/meshes/bunny.serialized, or
/// // ./shared/meshes/meshes/bunny.serialized if the first is missing.
/// let file = vfs.open("scene/meshes/bunny.serialized")?;
/// ```
pub struct FileSystemProvider {
    roots: Vec<PathBuf>,
}

impl FileSystemProvider {
    /// Create a provider rooted at the given directory.
    ///
    /// The directory does not need to exist yet; it is checked at open time.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            roots: vec![root.into()],
        }
    }

    /// Append a fallback root, searched after all existing ones.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Search roots in lookup order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Resolve a VFS path to the first matching regular file.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        self.roots
            .iter()
            .map(|root| root.join(path))
            .find(|full| full.is_file())
    }
}

impl VfsProvider for FileSystemProvider {
    fn open(&self, path: &str) -> Result<Box<dyn VfsFile>, VfsError> {
        let full_path = self
            .resolve(path)
            .ok_or_else(|| VfsError::NotFound(path.to_owned()))?;
        log::debug!("opening {}", full_path.display());
        let file = File::open(full_path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn exists(&self, path: &str) -> Result<bool, VfsError> {
        Ok(self.resolve(path).is_some())
    }

    fn list_dir(&self, path: &str) -> Result<Vec<String>, VfsError> {
        let mut entries = Vec::new();
        for root in &self.roots {
            let full_path = root.join(path);
            if !full_path.is_dir() {
                continue;
            }
            for entry in std::fs::read_dir(full_path)? {
                let entry = entry?;
                if let Some(name) = entry.file_name().to_str() {
                    entries.push(name.to_owned());
                }
            }
        }
        entries.sort();
        entries.dedup();
        Ok(entries)
    }

    fn describe(&self, path: &str) -> String {
        match self.resolve(path) {
            Some(full) => full.display().to_string(),
            None => format!("{path} (not found in {} roots)", self.roots.len()),
        }
    }
}
