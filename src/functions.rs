//! src/functions.rs
use crate::cache::LocalCache;
use crate::counters::Counters;
use crate::error::TaskError;
use crate::job::JobConfiguration;
use crate::pair::Pair;
use crate::storage::FileSystem;
use std::fmt::Display;
use std::io::{self, BufWriter, Write};

pub trait MapEmitter {
    fn emit<K: Display, V: Display>(&mut self, record: &Pair<K, V>) -> io::Result<()>;
}

/// Everything a mapper may consult while it is being set up on a worker.
pub struct SetupContext<'a> {
    pub conf: &'a JobConfiguration,
    pub cache: &'a LocalCache,
    pub fs: &'a dyn FileSystem,
}

/// Per-task handle given to `Mapper::map`: the task's counters and its
/// output sink.
pub struct MapContext<'a, E: MapEmitter> {
    counters: &'a mut Counters,
    emitter: &'a mut E,
}

impl<'a, E: MapEmitter> MapContext<'a, E> {
    pub fn new(counters: &'a mut Counters, emitter: &'a mut E) -> Self {
        MapContext { counters, emitter }
    }

    pub fn increment(&mut self, counter: &'static str, by: u64) {
        self.counters.increment(counter, by);
    }

    pub fn emit<K: Display, V: Display>(&mut self, record: &Pair<K, V>) -> io::Result<()> {
        self.emitter.emit(record)
    }
}

/// A map-only processing step. `setup` runs once per worker before the
/// first record, `map` once per record.
pub trait Mapper: Sized {
    type Input;

    fn setup(context: &SetupContext<'_>) -> Result<Self, TaskError>;

    fn map<E: MapEmitter>(
        &mut self,
        offset: u64,
        input: Self::Input,
        context: &mut MapContext<'_, E>,
    ) -> Result<(), TaskError>;
}

/// Writes records as `key<TAB>value` lines, uncompressed.
pub struct FileMapEmitter {
    writer: BufWriter<Box<dyn Write + Send>>,
    records: u64,
}

impl FileMapEmitter {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: BufWriter::with_capacity(8192, writer),
            records: 0,
        }
    }

    /// Flushes the sink and returns the number of records written.
    pub fn close(mut self) -> io::Result<u64> {
        self.writer.flush()?;
        Ok(self.records)
    }
}

impl MapEmitter for FileMapEmitter {
    fn emit<K: Display, V: Display>(&mut self, record: &Pair<K, V>) -> io::Result<()> {
        writeln!(self.writer, "{}\t{}", record.left(), record.right())?;
        self.records += 1;
        Ok(())
    }
}
