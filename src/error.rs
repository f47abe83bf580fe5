//! src/error.rs
use crate::cache::CacheError;
use crate::collection::CollectionError;
use crate::docno::{LoadError, LookupError};
use crate::file_splitter::SplitError;
use crate::master::TaskId;
use crate::worker::WorkerId;
use std::path::PathBuf;
use std::time::Duration;

pub fn error_chain_fmt(
    f: &mut std::fmt::Formatter<'_>,
    e: &impl std::error::Error,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}

/// Failure of the once-per-worker setup step.
#[derive(thiserror::Error)]
pub enum InitError {
    #[error("job configuration has no '{0}' entry")]
    MissingScheme(&'static str),
    #[error("unknown docno mapping scheme '{scheme}' (registered: {})", .available.join(", "))]
    UnknownScheme {
        scheme: String,
        available: Vec<&'static str>,
    },
    #[error("expected exactly one cached docno mapping file, found {0}")]
    CacheFileCount(usize),
    #[error("failed to load docno mapping")]
    Load(#[from] LoadError),
}

impl std::fmt::Debug for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(f, self)
    }
}

/// Failure of a single map task attempt.
#[derive(thiserror::Error)]
pub enum TaskError {
    #[error("worker initialization failed")]
    Init(#[from] InitError),
    #[error("docno lookup failed")]
    Lookup(#[from] LookupError),
    #[error("failed to read input split")]
    Collection(#[from] CollectionError),
    #[error("failed to write task output")]
    Output(#[from] std::io::Error),
    #[error("task abandoned after the job stopped")]
    Cancelled,
}

impl std::fmt::Debug for TaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(f, self)
    }
}

#[derive(thiserror::Error)]
pub enum JobError {
    #[error("map-only jobs cannot run {0} reduce tasks")]
    ReduceTasksUnsupported(u32),
    #[error("job has no input path")]
    MissingInputPath,
    #[error("job has no output path")]
    MissingOutputPath,
    #[error("output path {0} already exists")]
    OutputExists(PathBuf),
    #[error("failed to plan input splits")]
    Splits(#[from] SplitError),
    #[error("failed to distribute cache files")]
    Cache(#[from] CacheError),
    #[error("{task} failed after {attempts} attempt(s)")]
    TaskFailed {
        task: TaskId,
        attempts: u32,
        #[source]
        source: TaskError,
    },
    #[error("job did not finish within {0:?}")]
    TimedOut(Duration),
    #[error("job was cancelled")]
    Cancelled,
    #[error("{0} panicked")]
    WorkerPanicked(WorkerId),
    #[error("job filesystem operation failed")]
    Io(#[from] std::io::Error),
}

impl std::fmt::Debug for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(f, self)
    }
}
