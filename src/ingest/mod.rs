//! One-shot ingestion of the historical complaint dataset
//!
//! Reads the labelled spreadsheet, embeds each description and upserts it
//! with its L1/L2/L3 triple. Gated on an empty store, so re-running is safe.

pub mod dataset;
pub mod loader;

pub use dataset::{read_complaints, ComplaintRow, ComplaintSource, SpreadsheetSource, REQUIRED_COLUMNS};
pub use loader::{DataLoader, LoadOutcome, INGEST_BATCH_SIZE};
