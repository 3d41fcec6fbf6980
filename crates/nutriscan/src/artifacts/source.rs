use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

/// Filesystem access used by the loader.
pub trait ArtifactSource {
    fn exists(&self, path: &Path) -> bool;
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;
}

/// Reads artifacts from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystemSource;

impl ArtifactSource for FileSystemSource {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(path)?))
    }
}

/// In-memory file table, mainly for exercising the loader without disk I/O.
#[derive(Debug, Default, Clone)]
pub struct InMemorySource {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }
}

impl ArtifactSource for InMemorySource {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        self.files
            .get(path)
            .map(|contents| Box::new(Cursor::new(contents.as_slice())) as Box<dyn Read + '_>)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }
}
