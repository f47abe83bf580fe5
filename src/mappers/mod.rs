//! src/mappers/mod.rs
mod docno;

pub use docno::{DOCNO_MAPPING_SCHEME, DOCS, DocnoMapper};
