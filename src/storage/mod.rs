//! src/storage/mod.rs
use std::io::{self, Read, Seek, Write};
use std::path::{Path, PathBuf};

mod local;
pub use local::LocalFileSystem;

pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// Filesystem handle shared by the job, its workers and the docno mappings.
pub trait FileSystem: Send + Sync {
    fn open(&self, path: &Path) -> io::Result<Box<dyn ReadSeek>>;

    /// Creates or truncates `path`, creating missing parent directories.
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + Send>>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    /// Returns whether anything was removed.
    fn delete(&self, path: &Path, recursive: bool) -> io::Result<bool>;

    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn is_dir(&self, path: &Path) -> bool;

    /// Regular files directly under `dir`, skipping names that start with
    /// `.` or `_`, sorted by name.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    fn len(&self, path: &Path) -> io::Result<u64>;
}
