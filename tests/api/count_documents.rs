//! tests/api/count_documents.rs
use crate::helpers::{PanickingFormat, SlowTrecFormat, TestApp};
use claims::{assert_matches, assert_ok, assert_ok_eq};
use docno_count::collection::TrecDocumentInputFormat;
use docno_count::count_docs::{CountDocuments, CountDocumentsArgs, CountDocumentsError};
use docno_count::docno::LookupError;
use docno_count::error::{InitError, JobError, TaskError};
use std::collections::BTreeSet;
use std::time::Duration;

fn pairs(expected: &[(&str, u32)]) -> Vec<(String, u32)> {
    expected
        .iter()
        .map(|(docid, docno)| (docid.to_string(), *docno))
        .collect()
}

#[tokio::test]
async fn every_document_is_emitted_with_its_docno_and_counted() {
    // Arrange
    let app = TestApp::spawn();
    let collection = app.write_collection(&[&["A", "B", "C"]]);
    let mapping = app.write_trec_mapping(&["A", "B", "C"]);

    // Act
    let result = app.count_documents(&app.args(&collection, &mapping)).await;

    // Assert
    assert_ok_eq!(result, 3);
    assert_eq!(app.read_pairs(), pairs(&[("A", 1), ("B", 2), ("C", 3)]));
    assert_eq!(std::fs::read_to_string(app.count_file()).unwrap(), "3");
    assert!(app.output_dir().join("_SUCCESS").exists());
}

#[tokio::test]
async fn rerunning_replaces_previous_output() {
    let app = TestApp::spawn();
    let collection = app.write_collection(&[&["A", "B", "C"]]);
    let mapping = app.write_trec_mapping(&["A", "B", "C"]);
    std::fs::create_dir_all(app.output_dir()).unwrap();
    std::fs::write(app.output_dir().join("part-m-00042"), "O1\t7\n").unwrap();
    std::fs::write(app.count_file(), "123456\n").unwrap();

    let args = app.args(&collection, &mapping);
    assert_ok_eq!(app.count_documents(&args).await, 3);
    let first = app.read_pairs();
    assert_ok_eq!(app.count_documents(&args).await, 3);

    assert!(!app.output_dir().join("part-m-00042").exists());
    assert_eq!(app.read_pairs(), first);
    assert_eq!(first, pairs(&[("A", 1), ("B", 2), ("C", 3)]));
    assert_eq!(std::fs::read_to_string(app.count_file()).unwrap(), "3");
}

#[tokio::test]
async fn missing_required_options_are_rejected_before_any_side_effect() {
    let app = TestApp::spawn();
    let collection = app.write_collection(&[&["A"]]);
    let mapping = app.write_trec_mapping(&["A"]);
    let complete = app.args(&collection, &mapping);

    let without_collection = CountDocumentsArgs {
        collection: None,
        ..complete.clone()
    };
    let without_output = CountDocumentsArgs {
        output: None,
        ..complete.clone()
    };
    let without_mapping = CountDocumentsArgs {
        docno_mapping: None,
        ..complete
    };

    for args in [without_collection, without_output, without_mapping] {
        let result = app.count_documents(&args).await;
        assert_matches!(result, Err(CountDocumentsError::Usage(_)));
    }
    assert!(!app.output_dir().exists());
    assert!(!app.count_file().exists());
}

#[tokio::test]
async fn docid_missing_from_the_mapping_fails_the_job() {
    let app = TestApp::spawn();
    let collection = app.write_collection(&[&["A", "B", "Z"]]);
    let mapping = app.write_trec_mapping(&["A", "B"]);

    let result = app.count_documents(&app.args(&collection, &mapping)).await;

    assert_matches!(
        result,
        Err(CountDocumentsError::Job(JobError::TaskFailed {
            source: TaskError::Lookup(LookupError::UnknownDocid(ref docid)),
            ..
        })) if docid == "Z"
    );
    assert!(!app.count_file().exists());
    assert!(!app.output_dir().join("_SUCCESS").exists());
}

#[tokio::test]
async fn many_small_splits_across_workers_see_each_document_once() {
    let mut app = TestApp::spawn();
    app.settings.cluster.workers = 3;
    app.settings.job.split_size_in_bytes = 100;

    let docids: Vec<String> = (0..60).map(|i| format!("FT911-{i:04}")).collect();
    let docids: Vec<&str> = docids.iter().map(String::as_str).collect();
    let collection = app.write_collection(&[&docids[..25], &docids[25..40], &[], &docids[40..]]);
    let mapping = app.write_trec_mapping(&docids);

    let count = assert_ok!(app.count_documents(&app.args(&collection, &mapping)).await);

    assert_eq!(count, 60);
    let emitted = app.read_pairs();
    assert_eq!(emitted.len(), 60);
    let seen: BTreeSet<_> = emitted.iter().map(|(docid, _)| docid.as_str()).collect();
    assert_eq!(seen.len(), 60);
    for (docid, docno) in &emitted {
        let rank = docids.iter().position(|d| d == docid).unwrap() as u32 + 1;
        assert_eq!(*docno, rank);
    }
}

#[tokio::test]
async fn unknown_scheme_fails_worker_initialization() {
    let app = TestApp::spawn();
    let collection = app.write_collection(&[&["A"]]);
    let mapping = app.write_trec_mapping(&["A"]);

    let result = CountDocuments::new(&app.settings, "clueweb", TrecDocumentInputFormat)
        .run(&app.args(&collection, &mapping))
        .await;

    assert_matches!(
        result,
        Err(CountDocumentsError::Job(JobError::TaskFailed {
            source: TaskError::Init(InitError::UnknownScheme { .. }),
            ..
        }))
    );
    assert!(!app.count_file().exists());
}

#[tokio::test]
async fn tsv_mappings_keep_their_explicit_docnos() {
    let app = TestApp::spawn();
    let collection = app.write_collection(&[&["B", "A"]]);
    let mapping = app.write_tsv_mapping(&[("A", 10), ("B", 20)]);

    let result = CountDocuments::new(&app.settings, "tsv", TrecDocumentInputFormat)
        .run(&app.args(&collection, &mapping))
        .await;

    assert_ok_eq!(result, 2);
    assert_eq!(app.read_pairs(), pairs(&[("B", 20), ("A", 10)]));
}

#[tokio::test]
async fn empty_collection_counts_zero() {
    let app = TestApp::spawn();
    let collection = app.write_collection(&[&[]]);
    let mapping = app.write_trec_mapping(&["A"]);

    let result = app.count_documents(&app.args(&collection, &mapping)).await;

    assert_ok_eq!(result, 0);
    assert!(app.read_pairs().is_empty());
    assert_eq!(std::fs::read_to_string(app.count_file()).unwrap(), "0");
}

#[tokio::test]
async fn count_file_is_optional() {
    let app = TestApp::spawn();
    let collection = app.write_collection(&[&["A", "B"]]);
    let mapping = app.write_trec_mapping(&["A", "B"]);
    let args = CountDocumentsArgs {
        count_output: None,
        ..app.args(&collection, &mapping)
    };

    assert_ok_eq!(app.count_documents(&args).await, 2);
    assert!(!app.count_file().exists());
}

#[tokio::test]
async fn timed_out_job_writes_no_count_file() {
    let mut app = TestApp::spawn();
    app.settings.job.timeout_seconds = Some(1);
    let collection = app.write_collection(&[&["A", "B"]]);
    let mapping = app.write_trec_mapping(&["A", "B"]);
    std::fs::write(app.count_file(), "42").unwrap();

    let slow = SlowTrecFormat(Duration::from_millis(1500));
    let result = CountDocuments::new(&app.settings, "trec", slow)
        .run(&app.args(&collection, &mapping))
        .await;

    assert_matches!(result, Err(CountDocumentsError::Job(JobError::TimedOut(_))));
    assert_eq!(std::fs::read_to_string(app.count_file()).unwrap(), "42");
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(app.read_pairs().is_empty());
}

#[tokio::test]
async fn panicking_worker_writes_no_count_file() {
    let app = TestApp::spawn();
    let collection = app.write_collection(&[&["A", "B"]]);
    let mapping = app.write_trec_mapping(&["A", "B"]);

    let result = CountDocuments::new(&app.settings, "trec", PanickingFormat)
        .run(&app.args(&collection, &mapping))
        .await;

    assert_matches!(
        result,
        Err(CountDocumentsError::Job(JobError::WorkerPanicked(_)))
    );
    assert!(!app.count_file().exists());
    assert!(!app.output_dir().join("_SUCCESS").exists());
}
