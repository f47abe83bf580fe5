//! src/count_docs.rs
use crate::collection::{InputFormat, TrecDocumentInputFormat};
use crate::configuration::Settings;
use crate::error::{JobError, error_chain_fmt};
use crate::job::Job;
use crate::mappers::{DOCNO_MAPPING_SCHEME, DOCS, DocnoMapper};
use crate::storage::{FileSystem, LocalFileSystem};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const JOB_NAME: &str = "CountDocuments";

/// Paths a counting run needs. Missing required paths are reported by
/// `CountDocuments::run` before anything touches the filesystem.
#[derive(Clone, Debug, Default)]
pub struct CountDocumentsArgs {
    pub collection: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub docno_mapping: Option<PathBuf>,
    pub count_output: Option<PathBuf>,
}

struct ValidatedArgs<'a> {
    collection: &'a Path,
    output: &'a Path,
    docno_mapping: &'a Path,
    count_output: Option<&'a Path>,
}

impl CountDocumentsArgs {
    fn validate(&self) -> Result<ValidatedArgs<'_>, CountDocumentsError> {
        Ok(ValidatedArgs {
            collection: required(&self.collection, "collection")?,
            output: required(&self.output, "output")?,
            docno_mapping: required(&self.docno_mapping, "docno-mapping")?,
            count_output: self.count_output.as_deref(),
        })
    }
}

fn required<'a>(path: &'a Option<PathBuf>, flag: &str) -> Result<&'a Path, CountDocumentsError> {
    path.as_deref()
        .ok_or_else(|| CountDocumentsError::Usage(format!("missing required option --{flag}")))
}

#[derive(thiserror::Error)]
pub enum CountDocumentsError {
    #[error("{0}")]
    Usage(String),
    #[error("document counting job failed")]
    Job(#[from] JobError),
    #[error("filesystem operation on {path} failed")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl std::fmt::Debug for CountDocumentsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(f, self)
    }
}

/// Counts the documents of a collection while writing the docno of every
/// document to the output directory.
pub struct CountDocuments<F> {
    settings: Settings,
    scheme: String,
    input_format: F,
    fs: Arc<dyn FileSystem>,
}

impl CountDocuments<TrecDocumentInputFormat> {
    /// A TREC collection on the local filesystem, using the configured
    /// mapping scheme.
    pub fn trec(settings: &Settings) -> Self {
        CountDocuments::new(settings, &settings.job.docno_mapping, TrecDocumentInputFormat)
    }
}

impl<F: InputFormat> CountDocuments<F> {
    pub fn new(settings: &Settings, scheme: &str, input_format: F) -> Self {
        CountDocuments {
            settings: settings.clone(),
            scheme: scheme.to_string(),
            input_format,
            fs: Arc::new(LocalFileSystem),
        }
    }

    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_string();
        self
    }

    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Runs the job and returns the number of documents read.
    ///
    /// Anything already at the output path is deleted first. The count file
    /// is written only after the job has succeeded.
    #[tracing::instrument(name = "Count documents", skip_all, fields(scheme = %self.scheme))]
    pub async fn run(&self, args: &CountDocumentsArgs) -> Result<u64, CountDocumentsError> {
        let args = args.validate()?;
        tracing::info!(" - input path: {}", args.collection.display());
        tracing::info!(" - output path: {}", args.output.display());
        tracing::info!(" - docno mapping file: {}", args.docno_mapping.display());

        let mut job = Job::new(JOB_NAME, &self.settings, self.fs.clone());
        job.set_num_reduce_tasks(0);
        job.conf_mut().set(DOCNO_MAPPING_SCHEME, &self.scheme);
        job.add_cache_file(args.docno_mapping);
        job.set_input_path(args.collection);
        job.set_output_path(args.output);

        let deleted = self
            .fs
            .delete(args.output, true)
            .map_err(|source| CountDocumentsError::Io {
                path: args.output.to_path_buf(),
                source,
            })?;
        if deleted {
            tracing::info!("Deleted existing output {}", args.output.display());
        }

        let report = job
            .run::<DocnoMapper<F::Document>, F>(self.input_format.clone())
            .await?;
        let count = report.counters().get(DOCS);
        tracing::info!(job_id = %report.job_id(), "Read {} docs.", count);

        if let Some(path) = args.count_output {
            self.write_count(path, count)
                .map_err(|source| CountDocumentsError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        Ok(count)
    }

    fn write_count(&self, path: &Path, count: u64) -> std::io::Result<()> {
        let mut out = self.fs.create(path)?;
        out.write_all(count.to_string().as_bytes())?;
        out.flush()
    }
}
