//! tests/api/helpers.rs
use docno_count::collection::{
    CollectionError, InputFormat, TrecDocumentInputFormat, TrecDocumentReader,
};
use docno_count::configuration::{Settings, TelemetrySettings, get_configuration};
use docno_count::file_splitter::InputSplit;
use docno_count::count_docs::{CountDocuments, CountDocumentsArgs, CountDocumentsError};
use docno_count::docno::TrecDocnoMapping;
use docno_count::storage::{FileSystem, LocalFileSystem};
use docno_count::telemetry::init_tracing;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;
use tempfile::TempDir;

// Tracing output is opt-in: run with `TEST_LOG=1` to see it.
static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let settings = TelemetrySettings {
            otlp_enabled: false,
        };
        init_tracing("tests::api", &settings).expect("Failed to setup tracing");
    }
});

pub struct TestApp {
    pub dir: TempDir,
    pub settings: Settings,
}

impl TestApp {
    pub fn spawn() -> Self {
        LazyLock::force(&TRACING);
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut settings = get_configuration().expect("Failed to read configuration");
        settings.cluster.work_dir = dir.path().join("work");
        TestApp { dir, settings }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Writes one TREC shard per entry of `shards` under `collection/`.
    pub fn write_collection(&self, shards: &[&[&str]]) -> PathBuf {
        let collection = self.path("collection");
        std::fs::create_dir_all(&collection).expect("Failed to create collection dir");
        for (i, docids) in shards.iter().enumerate() {
            std::fs::write(collection.join(format!("shard-{i:02}.sgml")), trec_shard(docids))
                .expect("Failed to write shard");
        }
        collection
    }

    pub fn write_trec_mapping(&self, docids: &[&str]) -> PathBuf {
        let path = self.path("docno-mapping.dat");
        TrecDocnoMapping::write_mapping(docids.iter().copied(), &path, &LocalFileSystem)
            .expect("Failed to write docno mapping");
        path
    }

    pub fn write_tsv_mapping(&self, entries: &[(&str, u32)]) -> PathBuf {
        let path = self.path("docno-mapping.tsv");
        let body: String = entries
            .iter()
            .map(|(docid, docno)| format!("{docid}\t{docno}\n"))
            .collect();
        std::fs::write(&path, body).expect("Failed to write docno mapping");
        path
    }

    pub fn args(&self, collection: &Path, docno_mapping: &Path) -> CountDocumentsArgs {
        CountDocumentsArgs {
            collection: Some(collection.to_path_buf()),
            output: Some(self.output_dir()),
            docno_mapping: Some(docno_mapping.to_path_buf()),
            count_output: Some(self.count_file()),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.path("output")
    }

    pub fn count_file(&self) -> PathBuf {
        self.path("count.txt")
    }

    pub async fn count_documents(
        &self,
        args: &CountDocumentsArgs,
    ) -> Result<u64, CountDocumentsError> {
        CountDocuments::trec(&self.settings).run(args).await
    }

    /// Every `(docid, docno)` line of the committed part files, in part
    /// file order.
    pub fn read_pairs(&self) -> Vec<(String, u32)> {
        let parts = LocalFileSystem
            .list_files(&self.output_dir())
            .expect("Failed to list output");
        let mut pairs = Vec::new();
        for part in parts {
            let body = std::fs::read_to_string(&part).expect("Failed to read part file");
            for line in body.lines() {
                let (docid, docno) = line.split_once('\t').expect("Line has no tab");
                pairs.push((docid.to_string(), docno.parse().expect("Invalid docno")));
            }
        }
        pairs
    }
}

pub fn trec_shard(docids: &[&str]) -> String {
    docids
        .iter()
        .map(|docid| {
            format!("<DOC>\n<DOCNO> {docid} </DOCNO>\n<TEXT>\nSome text about {docid}.\n</TEXT>\n</DOC>\n")
        })
        .collect()
}

/// TREC input that stalls before reading each split.
#[derive(Clone)]
pub struct SlowTrecFormat(pub Duration);

impl InputFormat for SlowTrecFormat {
    type Document = <TrecDocumentInputFormat as InputFormat>::Document;
    type Reader = TrecDocumentReader;

    fn create_reader(
        &self,
        split: &InputSplit,
        fs: &dyn FileSystem,
    ) -> Result<TrecDocumentReader, CollectionError> {
        std::thread::sleep(self.0);
        TrecDocumentInputFormat.create_reader(split, fs)
    }
}

/// TREC input whose reader never opens.
#[derive(Clone)]
pub struct PanickingFormat;

impl InputFormat for PanickingFormat {
    type Document = <TrecDocumentInputFormat as InputFormat>::Document;
    type Reader = TrecDocumentReader;

    fn create_reader(
        &self,
        _split: &InputSplit,
        _fs: &dyn FileSystem,
    ) -> Result<TrecDocumentReader, CollectionError> {
        panic!("collection reader failed to open");
    }
}
