//! Dataset ingestion over in-memory fakes

mod common;

use common::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use complaint_classifier::errors::ClassifierError;
use complaint_classifier::index::VectorStore;
use complaint_classifier::ingest::{DataLoader, LoadOutcome, SpreadsheetSource};

#[tokio::test]
async fn test_load_into_empty_store() {
    let store = Arc::new(InMemoryStore::new());
    let loader = DataLoader::new(
        Arc::new(FakeEmbedder::new()),
        store.clone(),
        Box::new(VecSource::new(sample_source_rows())),
    )
    .with_batch_size(4);

    let outcome = loader.load_data().await.unwrap();
    assert_eq!(outcome, LoadOutcome::Loaded { ingested: 6, count: 6 });
    // 6 rows in batches of 4
    assert_eq!(store.upserts.load(Ordering::SeqCst), 2);

    let records = store.records();
    let ids: Vec<String> = records.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["0", "1", "2", "3", "4", "5"]);
    for (record, (description, codes)) in records.iter().zip(sample_rows()) {
        assert_eq!(record.description, description);
        assert_eq!(record.codes, codes);
    }
}

#[tokio::test]
async fn test_second_load_is_a_no_op() {
    let store = Arc::new(InMemoryStore::new());
    let embedder = Arc::new(FakeEmbedder::new());

    let loader = DataLoader::new(
        embedder.clone(),
        store.clone(),
        Box::new(VecSource::new(sample_source_rows())),
    );
    loader.load_data().await.unwrap();
    let calls_after_first = embedder.calls.load(Ordering::SeqCst);

    let outcome = loader.load_data().await.unwrap();
    assert_eq!(outcome, LoadOutcome::AlreadyLoaded { count: 6 });
    assert_eq!(embedder.calls.load(Ordering::SeqCst), calls_after_first);
    assert_eq!(store.records().len(), 6);
}

#[tokio::test]
async fn test_non_empty_store_skips_reading() {
    let store = Arc::new(InMemoryStore::seeded(&sample_rows()[..1]));
    let loader = DataLoader::new(
        Arc::new(FakeEmbedder::new()),
        store,
        Box::new(SpreadsheetSource::new("/does/not/exist.xlsx")),
    );

    // The missing file is never opened
    assert_eq!(loader.load_data().await.unwrap(), LoadOutcome::AlreadyLoaded { count: 1 });
}

#[tokio::test]
async fn test_failed_batch_aborts_and_keeps_earlier_batches() {
    let store = Arc::new(InMemoryStore::new());
    let loader = DataLoader::new(
        Arc::new(FlakyEmbedder::new(1)),
        store.clone(),
        Box::new(VecSource::new(sample_source_rows())),
    )
    .with_batch_size(2);

    let err = loader.load_data().await.unwrap_err();
    assert!(matches!(err, ClassifierError::EmbeddingError(_)));
    assert_eq!(store.records().len(), 2);

    // A partial ingestion counts as loaded
    let retry = DataLoader::new(
        Arc::new(FakeEmbedder::new()),
        store.clone(),
        Box::new(VecSource::new(sample_source_rows())),
    );
    assert_eq!(retry.load_data().await.unwrap(), LoadOutcome::AlreadyLoaded { count: 2 });
}

#[tokio::test]
async fn test_missing_dataset_is_reported() {
    let store = Arc::new(InMemoryStore::new());
    let loader = DataLoader::new(
        Arc::new(FakeEmbedder::new()),
        store.clone(),
        Box::new(SpreadsheetSource::new("/does/not/exist.xlsx")),
    );

    assert!(matches!(
        loader.load_data().await,
        Err(ClassifierError::DatasetError(_))
    ));
    assert!(store.records().is_empty());
}

#[tokio::test]
async fn test_zero_batch_size_rejected() {
    let loader = DataLoader::new(
        Arc::new(FakeEmbedder::new()),
        Arc::new(InMemoryStore::new()),
        Box::new(VecSource::new(sample_source_rows())),
    )
    .with_batch_size(0);

    assert!(matches!(
        loader.load_data().await,
        Err(ClassifierError::ConfigError(_))
    ));
}

#[tokio::test]
async fn test_empty_dataset_loads_nothing() {
    let store = Arc::new(InMemoryStore::new());
    let loader = DataLoader::new(
        Arc::new(FakeEmbedder::new()),
        store.clone(),
        Box::new(VecSource::new(Vec::new())),
    );

    assert_eq!(
        loader.load_data().await.unwrap(),
        LoadOutcome::Loaded { ingested: 0, count: 0 }
    );
}

#[tokio::test]
async fn test_reset_then_reload() {
    let store = Arc::new(InMemoryStore::seeded(&sample_rows()[..2]));
    let loader = DataLoader::new(
        Arc::new(FakeEmbedder::new()),
        store.clone(),
        Box::new(VecSource::new(sample_source_rows())),
    );
    assert_eq!(loader.load_data().await.unwrap(), LoadOutcome::AlreadyLoaded { count: 2 });

    store.reset().await.unwrap();
    assert_eq!(
        loader.load_data().await.unwrap(),
        LoadOutcome::Loaded { ingested: 6, count: 6 }
    );
}
