//! src/docno/mod.rs
use crate::error::error_chain_fmt;
use crate::storage::FileSystem;
use std::fmt;
use std::path::{Path, PathBuf};

mod trec;
mod tsv;

pub use trec::TrecDocnoMapping;
pub use tsv::TsvDocnoMapping;

/// Translates external document identifiers (docids) into the dense,
/// collection-specific sequence numbers (docnos) used downstream.
///
/// Implementations are loaded once per worker from a read-only artifact and
/// then only queried.
pub trait DocnoMapping: fmt::Debug + Send + Sync {
    fn load(&mut self, path: &Path, fs: &dyn FileSystem) -> Result<(), LoadError>;

    fn docno(&self, docid: &str) -> Result<u32, LookupError>;

    fn docid(&self, docno: u32) -> Option<&str>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(thiserror::Error)]
pub enum LoadError {
    #[error("failed to read docno mapping {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("docno mapping {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

impl LoadError {
    pub(crate) fn corrupt(path: &Path, reason: impl Into<String>) -> Self {
        LoadError::Corrupt {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Debug for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(f, self)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LookupError {
    #[error("no docno is mapped to docid '{0}'")]
    UnknownDocid(String),
}
