//! Ollama API streaming client
//!
//! Provides real-time token streaming from Ollama with:
//! - HTTP/1.1 streaming via reqwest
//! - Endpoint: POST /api/chat
//! - No request timeout: a stalled model blocks the caller

use async_trait::async_trait;
use futures_util::{stream, Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::pin::Pin;
use tracing::debug;

use super::parser::JsonParser;
use super::{ChatModel, FragmentStream};
use crate::errors::{ClassifierError, Result};

/// Default Ollama API endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default chat model
pub const DEFAULT_MODEL: &str = "qwen2.5:7b-instruct";

/// Ollama streaming client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    /// Create new Ollama client against the default endpoint
    pub fn new() -> Result<Self> {
        Self::with_url(DEFAULT_OLLAMA_URL)
    }

    /// Create Ollama client for a custom endpoint
    pub fn with_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(ClassifierError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn stream_chat(&self, model: &str, prompt: &str) -> Result<FragmentStream> {
        let url = format!("{}/api/chat", self.base_url);

        let request = OllamaChatRequest {
            model: model.to_string(),
            messages: vec![OllamaMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: true,
        };

        debug!(%url, model, "starting chat stream");
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClassifierError::OllamaApiError(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let detail = serde_json::from_str::<OllamaErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(ClassifierError::OllamaApiError(format!("HTTP {}: {}", status, detail)));
        }

        let bytes = response
            .bytes_stream()
            .map(|result| {
                result
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| ClassifierError::StreamingError(e.to_string()))
            });

        Ok(fragments_from_bytes(bytes))
    }
}

/// Turn a raw NDJSON byte stream into text fragments.
///
/// Ends after a chunk with `done: true` or when the bytes run out. A
/// transport error, a chunk carrying `error`, or a truncated trailing object
/// is yielded as a final `Err`.
pub fn fragments_from_bytes<S>(bytes: S) -> FragmentStream
where
    S: Stream<Item = Result<Vec<u8>>> + Send + 'static,
{
    let state = FragmentState {
        bytes: Box::pin(bytes),
        parser: JsonParser::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => state.absorb(&chunk),
                Some(Err(e)) => state.fail(e),
                None => {
                    state.finished = true;
                    if !state.parser.is_drained() {
                        state.pending.push_back(Err(ClassifierError::StreamingError(
                            "stream ended inside a JSON object".to_string(),
                        )));
                    }
                }
            }
        }
    }))
}

struct FragmentState<S> {
    bytes: Pin<Box<S>>,
    parser: JsonParser,
    pending: VecDeque<Result<String>>,
    finished: bool,
}

impl<S> FragmentState<S> {
    fn absorb(&mut self, chunk: &[u8]) {
        let objects = match self
            .parser
            .add_bytes(chunk)
            .and_then(|_| self.parser.drain_objects())
        {
            Ok(objects) => objects,
            Err(e) => return self.fail(e),
        };

        for json in objects {
            let parsed = match self.parser.parse_chunk(&json) {
                Ok(parsed) => parsed,
                Err(e) => return self.fail(e),
            };
            if let Some(error) = parsed.error {
                return self.fail(ClassifierError::OllamaApiError(error));
            }
            if let Some(content) = parsed.content() {
                self.pending.push_back(Ok(content.to_string()));
            }
            if parsed.done {
                self.finished = true;
                return;
            }
        }
    }

    fn fail(&mut self, error: ClassifierError) {
        self.pending.push_back(Err(error));
        self.finished = true;
    }
}

/// Ollama chat request
#[derive(Debug, Clone, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
}

#[derive(Debug, Clone, Serialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

/// Body of a non-2xx Ollama response
#[derive(Debug, Deserialize)]
struct OllamaErrorBody {
    error: String,
}
