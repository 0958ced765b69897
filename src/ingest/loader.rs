//! Batched, idempotent ingestion into the vector store

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tracing::{debug, info};

use super::dataset::ComplaintSource;
use crate::errors::{ClassifierError, Result};
use crate::index::{Embedder, VectorStore};
use crate::types::ComplaintRecord;

/// Rows embedded and upserted per round trip
pub const INGEST_BATCH_SIZE: usize = 500;

/// What a call to [`DataLoader::load_data`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Store already had documents; nothing was read
    AlreadyLoaded { count: u64 },
    /// Dataset was ingested; `count` is the store size afterwards
    Loaded { ingested: usize, count: u64 },
}

/// Loads the complaint dataset into an empty store.
///
/// A failed batch aborts the whole call. Batches written before the failure
/// stay in the store, and because the gate only checks for a non-empty
/// store, a later call will not top up a partial ingestion.
pub struct DataLoader {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    source: Box<dyn ComplaintSource>,
    batch_size: usize,
    show_progress: bool,
}

impl DataLoader {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        source: Box<dyn ComplaintSource>,
    ) -> Self {
        Self {
            embedder,
            store,
            source,
            batch_size: INGEST_BATCH_SIZE,
            show_progress: false,
        }
    }

    /// Override the batch size (must be non-zero)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Draw a progress bar on stderr while embedding
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Ingest the dataset unless the store already holds documents
    pub async fn load_data(&self) -> Result<LoadOutcome> {
        let existing = self.store.count().await?;
        if existing > 0 {
            info!(count = existing, "Data already loaded in the collection");
            return Ok(LoadOutcome::AlreadyLoaded { count: existing });
        }

        if self.batch_size == 0 {
            return Err(ClassifierError::ConfigError("batch size must be greater than 0".to_string()));
        }

        info!(source = %self.source.describe(), "Loading data into the collection");
        let rows = self.source.read_rows()?;
        let records: Vec<ComplaintRecord> = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| ComplaintRecord::new(i as u64, row.description, row.codes))
            .collect();

        self.store.ensure_collection(self.embedder.dimension()).await?;

        let progress = self.progress_bar(records.len() as u64);
        for (batch_no, batch) in records.chunks(self.batch_size).enumerate() {
            let texts: Vec<&str> = batch.iter().map(|r| r.description.as_str()).collect();
            let vectors = self.embedder.embed_batch(&texts)?;
            self.store.upsert_batch(batch, vectors).await?;

            debug!(batch = batch_no, rows = batch.len(), "batch ingested");
            progress.inc(batch.len() as u64);
        }
        progress.finish_and_clear();

        let count = self.store.count().await?;
        info!(count, "Data loaded successfully");

        Ok(LoadOutcome::Loaded {
            ingested: records.len(),
            count,
        })
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.cyan} Embedding [{bar:40.cyan/blue}] {pos}/{len} | ETA: {eta}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb
    }
}
