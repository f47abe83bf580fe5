//! src/mappers/docno.rs
use crate::collection::Indexable;
use crate::docno::DocnoMapping;
use crate::error::{InitError, TaskError};
use crate::functions::{MapContext, MapEmitter, Mapper, SetupContext};
use crate::pair::Pair;
use crate::registry;
use std::fmt;
use std::marker::PhantomData;

/// Job configuration key naming the docno mapping scheme to load.
pub const DOCNO_MAPPING_SCHEME: &str = "docno.mapping.scheme";

/// Counter of documents seen by the mapper.
pub const DOCS: &str = "DOCS";

/// Emits `(docid, docno)` for every document and counts them.
pub struct DocnoMapper<D> {
    mapping: Box<dyn DocnoMapping>,
    record: Pair<String, u32>,
    _document: PhantomData<fn(D)>,
}

impl<D> DocnoMapper<D> {
    /// Loads the mapping named in the job configuration from the worker's
    /// single cached artifact.
    #[tracing::instrument(name = "Initialize docno mapper", skip_all)]
    pub fn initialize(context: &SetupContext<'_>) -> Result<Self, InitError> {
        let scheme = context
            .conf
            .get(DOCNO_MAPPING_SCHEME)
            .ok_or(InitError::MissingScheme(DOCNO_MAPPING_SCHEME))?;
        let mut mapping =
            registry::get_docno_mapping(scheme).ok_or_else(|| InitError::UnknownScheme {
                scheme: scheme.to_string(),
                available: registry::list_docno_mappings(),
            })?;

        let path = match context.cache.local_files() {
            [path] => path,
            files => return Err(InitError::CacheFileCount(files.len())),
        };
        mapping.load(path, context.fs)?;
        tracing::info!(scheme, docids = mapping.len(), "Loaded docno mapping");

        Ok(DocnoMapper {
            mapping,
            record: Pair::default(),
            _document: PhantomData,
        })
    }
}

impl<D> fmt::Debug for DocnoMapper<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocnoMapper")
            .field("mapping", &self.mapping)
            .field("record", &self.record)
            .finish()
    }
}

impl<D: Indexable> Mapper for DocnoMapper<D> {
    type Input = D;

    fn setup(context: &SetupContext<'_>) -> Result<Self, TaskError> {
        Ok(Self::initialize(context)?)
    }

    fn map<E: MapEmitter>(
        &mut self,
        _offset: u64,
        document: D,
        context: &mut MapContext<'_, E>,
    ) -> Result<(), TaskError> {
        context.increment(DOCS, 1);
        let docno = self.mapping.docno(document.docid())?;

        let docid = self.record.left_mut();
        docid.clear();
        docid.push_str(document.docid());
        self.record.set_right(docno);
        context.emit(&self.record)?;
        Ok(())
    }
}
