//! In-memory fakes of the four external collaborators
#![allow(dead_code)]

use async_trait::async_trait;
use futures_util::stream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use complaint_classifier::errors::{ClassifierError, Result};
use complaint_classifier::index::{Embedder, VectorStore};
use complaint_classifier::ingest::{ComplaintRow, ComplaintSource};
use complaint_classifier::rag::RelevanceScorer;
use complaint_classifier::streaming::{ChatModel, FragmentStream};
use complaint_classifier::types::{ComplaintRecord, ProblemCodes, ScoredComplaint};

pub const FAKE_DIMENSION: usize = 32;

/// Bag-of-words hashing embedder; texts sharing words point the same way
pub struct FakeEmbedder {
    pub calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }

    fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; FAKE_DIMENSION];
        for word in text.to_lowercase().split(|c: char| !c.is_alphanumeric()) {
            if word.is_empty() {
                continue;
            }
            let slot = word.bytes().fold(7usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize));
            v[slot % FAKE_DIMENSION] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimension(&self) -> usize {
        FAKE_DIMENSION
    }
}

/// Embedder that fails on the n-th batch (0-based)
pub struct FlakyEmbedder {
    pub fail_on: usize,
    calls: AtomicUsize,
}

impl FlakyEmbedder {
    pub fn new(fail_on: usize) -> Self {
        Self { fail_on, calls: AtomicUsize::new(0) }
    }
}

impl Embedder for FlakyEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == self.fail_on {
            return Err(ClassifierError::EmbeddingError("model crashed".to_string()));
        }
        Ok(texts.iter().map(|t| FakeEmbedder::vector(t)).collect())
    }

    fn dimension(&self) -> usize {
        FAKE_DIMENSION
    }
}

/// Brute-force cosine store
pub struct InMemoryStore {
    points: Mutex<Vec<(ComplaintRecord, Vec<f32>)>>,
    dimension: Mutex<Option<usize>>,
    pub queries: AtomicUsize,
    pub upserts: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            points: Mutex::new(Vec::new()),
            dimension: Mutex::new(None),
            queries: AtomicUsize::new(0),
            upserts: AtomicUsize::new(0),
        }
    }

    /// Store pre-filled with `rows`, embedded by [`FakeEmbedder`]
    pub fn seeded(rows: &[(&str, ProblemCodes)]) -> Self {
        let store = Self::new();
        {
            let mut points = store.points.lock().unwrap();
            for (i, (description, codes)) in rows.iter().enumerate() {
                let record = ComplaintRecord::new(i as u64, *description, codes.clone());
                points.push((record, FakeEmbedder::vector(description)));
            }
        }
        *store.dimension.lock().unwrap() = Some(FAKE_DIMENSION);
        store
    }

    pub fn records(&self) -> Vec<ComplaintRecord> {
        self.points.lock().unwrap().iter().map(|(r, _)| r.clone()).collect()
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn ensure_collection(&self, dimension: usize) -> Result<()> {
        let mut current = self.dimension.lock().unwrap();
        match *current {
            Some(existing) if existing != dimension => Err(ClassifierError::VectorStoreError(
                format!("dimension mismatch: {} vs {}", existing, dimension),
            )),
            _ => {
                *current = Some(dimension);
                Ok(())
            }
        }
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.points.lock().unwrap().len() as u64)
    }

    async fn upsert_batch(&self, records: &[ComplaintRecord], vectors: Vec<Vec<f32>>) -> Result<()> {
        if records.len() != vectors.len() {
            return Err(ClassifierError::VectorStoreError("length mismatch".to_string()));
        }
        self.upserts.fetch_add(1, Ordering::SeqCst);
        let mut points = self.points.lock().unwrap();
        for (record, vector) in records.iter().cloned().zip(vectors) {
            points.retain(|(r, _)| r.index != record.index);
            points.push((record, vector));
        }
        Ok(())
    }

    async fn query(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredComplaint>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let points = self.points.lock().unwrap();
        let mut hits: Vec<ScoredComplaint> = points
            .iter()
            .map(|(record, v)| ScoredComplaint {
                id: record.id(),
                score: cosine(vector, v),
                document: record.description.clone(),
                codes: record.codes.clone(),
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn reset(&self) -> Result<()> {
        self.points.lock().unwrap().clear();
        *self.dimension.lock().unwrap() = None;
        Ok(())
    }
}

/// Store whose every call fails, as when Qdrant is down
pub struct DownStore;

#[async_trait]
impl VectorStore for DownStore {
    async fn ensure_collection(&self, _dimension: usize) -> Result<()> {
        Err(down())
    }

    async fn count(&self) -> Result<u64> {
        Err(down())
    }

    async fn upsert_batch(&self, _records: &[ComplaintRecord], _vectors: Vec<Vec<f32>>) -> Result<()> {
        Err(down())
    }

    async fn query(&self, _vector: &[f32], _limit: usize) -> Result<Vec<ScoredComplaint>> {
        Err(down())
    }

    async fn reset(&self) -> Result<()> {
        Err(down())
    }
}

fn down() -> ClassifierError {
    ClassifierError::VectorStoreError("connection refused".to_string())
}

/// Rows held in memory
pub struct VecSource {
    pub rows: Vec<ComplaintRow>,
    pub reads: AtomicUsize,
}

impl VecSource {
    pub fn new(rows: Vec<ComplaintRow>) -> Self {
        Self { rows, reads: AtomicUsize::new(0) }
    }
}

impl ComplaintSource for VecSource {
    fn read_rows(&self) -> Result<Vec<ComplaintRow>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.clone())
    }

    fn describe(&self) -> String {
        format!("{} in-memory rows", self.rows.len())
    }
}

/// Scores a chunk by how many query words it contains
pub struct OverlapScorer;

impl RelevanceScorer for OverlapScorer {
    fn score(&self, query: &str, candidates: &[&str]) -> Result<Vec<f32>> {
        let query = query.to_lowercase();
        Ok(candidates
            .iter()
            .map(|c| {
                let c = c.to_lowercase();
                query.split_whitespace().filter(|w| c.contains(w)).count() as f32
            })
            .collect())
    }
}

/// Replays a fixed reply and records the prompts it was sent
pub struct FakeChat {
    pub fragments: Vec<String>,
    pub prompts: Mutex<Vec<(String, String)>>,
}

impl FakeChat {
    pub fn replying(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().map(|(_, p)| p.clone())
    }
}

#[async_trait]
impl ChatModel for FakeChat {
    async fn stream_chat(&self, model: &str, prompt: &str) -> Result<FragmentStream> {
        self.prompts
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));
        let items: Vec<Result<String>> = self.fragments.iter().cloned().map(Ok).collect();
        Ok(Box::pin(stream::iter(items)))
    }
}

/// Fails at setup, like a missing model
pub struct MissingModelChat;

#[async_trait]
impl ChatModel for MissingModelChat {
    async fn stream_chat(&self, model: &str, _prompt: &str) -> Result<FragmentStream> {
        Err(ClassifierError::OllamaApiError(format!(
            "HTTP 404 Not Found: model '{}' not found",
            model
        )))
    }
}

/// Streams some text then drops the connection
pub struct DroppingChat;

#[async_trait]
impl ChatModel for DroppingChat {
    async fn stream_chat(&self, _model: &str, _prompt: &str) -> Result<FragmentStream> {
        let items: Vec<Result<String>> = vec![
            Ok("- L1: Elec".to_string()),
            Err(ClassifierError::StreamingError("connection reset".to_string())),
        ];
        Ok(Box::pin(stream::iter(items)))
    }
}

/// A small labelled history
pub fn sample_rows() -> Vec<(&'static str, ProblemCodes)> {
    vec![
        ("Screen flickers when brightness is low", ProblemCodes::new("Hardware", "Display", "Flicker")),
        ("Fan makes a loud grinding noise", ProblemCodes::new("Mechanical", "Cooling", "Fan noise")),
        ("Device does not power on after charging", ProblemCodes::new("Electrical", "Power", "No power")),
        ("Screen cracked after a drop", ProblemCodes::new("Hardware", "Display", "Physical damage")),
        ("Battery drains overnight", ProblemCodes::new("Electrical", "Battery", "Fast drain")),
        ("Great product, very happy", ProblemCodes::new("Non complaint", "Non complaint", "Non complaint")),
    ]
}

pub fn sample_source_rows() -> Vec<ComplaintRow> {
    sample_rows()
        .into_iter()
        .map(|(description, codes)| ComplaintRow {
            description: description.to_string(),
            codes,
        })
        .collect()
}
