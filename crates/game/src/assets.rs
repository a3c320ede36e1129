//! Asset file access.
//!
//! Loaders read through [`AssetSource`] so that the same parsing code serves
//! files on disk and assets held in memory.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Read access to asset files.
pub trait AssetSource {
    /// Read the whole file at `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Assets on the local filesystem.
///
/// Relative paths are resolved against the data directory when one is set.
#[derive(Debug, Clone, Default)]
pub struct FsAssets {
    data_dir: Option<PathBuf>,
}

impl FsAssets {
    /// Read paths as given (relative to the working directory).
    pub fn new() -> Self {
        Self { data_dir: None }
    }

    /// Resolve relative paths against `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
        }
    }

    /// Path that will actually be opened for `path`.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.data_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl AssetSource for FsAssets {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(path))
    }
}

/// Assets held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }
}

impl AssetSource for MemoryAssets {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not in the asset set", path.display()),
            )
        })
    }
}

/// Read a text asset, replacing invalid UTF-8.
pub(crate) fn read_text<A: AssetSource + ?Sized>(assets: &A, path: &Path) -> io::Result<String> {
    let bytes = assets.read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_assets() {
        let assets = MemoryAssets::new().with_file("a/b.obj", "v 0 0 0\n");

        assert_eq!(read_text(&assets, Path::new("a/b.obj")).unwrap(), "v 0 0 0\n");
        let err = assets.read(Path::new("missing.obj")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_fs_resolve() {
        let plain = FsAssets::new();
        assert_eq!(plain.resolve(Path::new("castle.obj")), PathBuf::from("castle.obj"));

        let rooted = FsAssets::with_data_dir("/data");
        assert_eq!(
            rooted.resolve(Path::new("castle/castle.obj")),
            PathBuf::from("/data/castle/castle.obj")
        );
        assert_eq!(rooted.resolve(Path::new("/abs/x.obj")), PathBuf::from("/abs/x.obj"));
    }
}
