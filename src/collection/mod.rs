//! src/collection/mod.rs
use crate::error::error_chain_fmt;
use crate::file_splitter::InputSplit;
use crate::storage::FileSystem;
use std::path::PathBuf;

mod trec;
pub use trec::{TrecDocument, TrecDocumentInputFormat, TrecDocumentReader};

/// A document that can be indexed: it knows its external identifier.
pub trait Indexable {
    fn docid(&self) -> &str;

    fn content(&self) -> &str;
}

/// Turns an input split into a lazy sequence of `(byte offset, document)`.
pub trait InputFormat: Clone + Send + Sync + 'static {
    type Document: Indexable + Send + 'static;
    type Reader: Iterator<Item = Result<(u64, Self::Document), CollectionError>>;

    fn create_reader(
        &self,
        split: &InputSplit,
        fs: &dyn FileSystem,
    ) -> Result<Self::Reader, CollectionError>;
}

#[derive(thiserror::Error)]
pub enum CollectionError {
    #[error("failed to read collection file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed document at byte {offset} of {path}: {reason}")]
    MalformedDocument {
        path: PathBuf,
        offset: u64,
        reason: &'static str,
    },
}

impl std::fmt::Debug for CollectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(f, self)
    }
}
