//! Incremental JSON parser for streaming responses
//!
//! Ollama streams one JSON object per line, but transport chunks do not
//! respect line boundaries. Objects are recovered by brace matching:
//! - Buffer: 1MB maximum
//! - Algorithm: O(n) single pass bracket matching, string-aware

use serde::Deserialize;

use crate::errors::{ClassifierError, Result};

/// Maximum buffer size (1MB)
pub const MAX_BUFFER_SIZE: usize = 1_048_576;

/// One streamed `/api/chat` object
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub message: Option<ChunkMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Message payload inside a chunk
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChunkMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl ChatChunk {
    /// Text carried by this chunk, if any
    pub fn content(&self) -> Option<&str> {
        self.message
            .as_ref()
            .map(|m| m.content.as_str())
            .filter(|c| !c.is_empty())
    }
}

/// Incremental JSON parser
#[derive(Debug)]
pub struct JsonParser {
    /// Accumulation buffer
    buffer: Vec<u8>,

    /// Maximum buffer size
    max_buffer_size: usize,
}

impl JsonParser {
    /// Create new JSON parser with default settings
    pub fn new() -> Self {
        Self::with_capacity(MAX_BUFFER_SIZE)
    }

    /// Create parser with custom buffer capacity
    pub fn with_capacity(max_buffer_size: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            max_buffer_size,
        }
    }

    /// Append bytes to the buffer
    pub fn add_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.buffer.len() + bytes.len() > self.max_buffer_size {
            return Err(ClassifierError::JsonParseError(format!(
                "Buffer overflow: {} bytes exceeds maximum {}",
                self.buffer.len() + bytes.len(),
                self.max_buffer_size
            )));
        }

        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    /// Remove and return the next complete JSON object, if one is buffered
    pub fn next_object(&mut self) -> Result<Option<String>> {
        if let Some((start, end)) = self.find_complete_json()? {
            let json_str = String::from_utf8_lossy(&self.buffer[start..=end]).to_string();
            self.buffer.drain(..=end);
            return Ok(Some(json_str));
        }

        Ok(None)
    }

    /// Remove and return every complete object currently buffered
    pub fn drain_objects(&mut self) -> Result<Vec<String>> {
        let mut objects = Vec::new();
        while let Some(json) = self.next_object()? {
            objects.push(json);
        }
        Ok(objects)
    }

    /// Find complete JSON object using bracket matching
    ///
    /// Returns: Some((start_index, end_index)) or None
    fn find_complete_json(&self) -> Result<Option<(usize, usize)>> {
        let mut depth: i64 = 0;
        let mut start: Option<usize> = None;
        let mut in_string = false;
        let mut escape_next = false;

        for (i, &byte) in self.buffer.iter().enumerate() {
            if escape_next {
                escape_next = false;
                continue;
            }

            if byte == b'\\' && in_string {
                escape_next = true;
                continue;
            }

            // Ignore braces inside strings
            if byte == b'"' {
                in_string = !in_string;
                continue;
            }

            if in_string {
                continue;
            }

            match byte {
                b'{' => {
                    if depth == 0 {
                        start = Some(i);
                    }
                    depth += 1;
                }
                b'}' => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(ClassifierError::JsonParseError(
                            "Mismatched braces: too many closing braces".to_string(),
                        ));
                    }
                    if let (0, Some(s)) = (depth, start) {
                        return Ok(Some((s, i)));
                    }
                }
                _ => {}
            }
        }

        Ok(None)
    }

    /// Parse an extracted object as a chat chunk
    pub fn parse_chunk(&self, json_str: &str) -> Result<ChatChunk> {
        serde_json::from_str(json_str)
            .map_err(|e| ClassifierError::JsonParseError(format!("Failed to parse chat chunk: {}", e)))
    }

    /// True when only whitespace is left in the buffer
    pub fn is_drained(&self) -> bool {
        self.buffer.iter().all(|b| b.is_ascii_whitespace())
    }
}

impl Default for JsonParser {
    fn default() -> Self {
        Self::new()
    }
}
