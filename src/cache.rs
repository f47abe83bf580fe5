//! src/cache.rs
use crate::error::error_chain_fmt;
use crate::storage::FileSystem;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error)]
pub enum CacheError {
    #[error("cache file {0} has no file name")]
    NoFileName(PathBuf),
    #[error("two cache files share the name {0:?}")]
    DuplicateName(String),
    #[error("failed to copy cache file {path} to a worker")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl std::fmt::Debug for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(f, self)
    }
}

/// A worker's private copies of the job's cache files.
#[derive(Clone, Debug, Default)]
pub struct LocalCache {
    files: Vec<PathBuf>,
}

impl LocalCache {
    /// Copies every source into `dir`, keeping file names.
    #[tracing::instrument(name = "Localize cache files", skip(sources, fs))]
    pub fn localize(
        dir: &Path,
        sources: &[PathBuf],
        fs: &dyn FileSystem,
    ) -> Result<Self, CacheError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| CacheError::Io { path, source }
        };
        fs.create_dir_all(dir).map_err(io_err(dir))?;

        let mut files: Vec<PathBuf> = Vec::with_capacity(sources.len());
        for source in sources {
            let name = source
                .file_name()
                .ok_or_else(|| CacheError::NoFileName(source.clone()))?;
            let target = dir.join(name);
            if files.contains(&target) {
                return Err(CacheError::DuplicateName(
                    name.to_string_lossy().into_owned(),
                ));
            }
            fs.copy(source, &target).map_err(io_err(source.as_path()))?;
            files.push(target);
        }
        Ok(LocalCache { files })
    }

    pub fn from_files(files: Vec<PathBuf>) -> Self {
        LocalCache { files }
    }

    pub fn local_files(&self) -> &[PathBuf] {
        &self.files
    }
}
