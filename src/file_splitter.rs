//! src/file_splitter.rs
use crate::error::error_chain_fmt;
use crate::storage::FileSystem;
use std::path::{Path, PathBuf};

/// A byte range of one shard, processed by a single map task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputSplit {
    path: PathBuf,
    start: u64,
    length: u64,
}

impl InputSplit {
    pub fn new(path: impl Into<PathBuf>, start: u64, length: u64) -> Self {
        InputSplit {
            path: path.into(),
            start,
            length,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn end(&self) -> u64 {
        self.start + self.length
    }
}

#[derive(thiserror::Error)]
pub enum SplitError {
    #[error("input path {0} does not exist")]
    MissingInput(PathBuf),
    #[error("input path {0} contains no files")]
    NoInputFiles(PathBuf),
    #[error("failed to inspect input path {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl std::fmt::Debug for SplitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(f, self)
    }
}

pub struct FileSplitter {
    split_size_in_bytes: u64,
}

impl FileSplitter {
    pub fn new(split_size_in_bytes: u64) -> Self {
        FileSplitter {
            split_size_in_bytes: split_size_in_bytes.max(1),
        }
    }

    /// Splits a single shard or every shard directly under a directory.
    /// Empty shards still get one (empty) split.
    #[tracing::instrument(name = "Split inputs", skip(self, fs))]
    pub fn split(&self, input: &Path, fs: &dyn FileSystem) -> Result<Vec<InputSplit>, SplitError> {
        if !fs.exists(input) {
            return Err(SplitError::MissingInput(input.to_path_buf()));
        }
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| SplitError::Io { path, source }
        };

        let shards = if fs.is_dir(input) {
            fs.list_files(input).map_err(io_err(input))?
        } else {
            vec![input.to_path_buf()]
        };
        if shards.is_empty() {
            return Err(SplitError::NoInputFiles(input.to_path_buf()));
        }

        let mut splits = Vec::new();
        for shard in shards {
            let len = fs.len(&shard).map_err(io_err(shard.as_path()))?;
            if len == 0 {
                splits.push(InputSplit::new(shard, 0, 0));
                continue;
            }
            let mut start = 0;
            while start < len {
                let length = self.split_size_in_bytes.min(len - start);
                splits.push(InputSplit::new(shard.clone(), start, length));
                start += length;
            }
        }
        tracing::debug!("Planned {} input splits", splits.len());
        Ok(splits)
    }
}
