//! Complaint records and their problem-code labels

use serde::{Deserialize, Serialize};

/// Payload key holding the raw description text
pub const DOCUMENT_KEY: &str = "document";

/// Payload keys for the three label levels, in display order
pub const L1_KEY: &str = "L1";
pub const L2_KEY: &str = "L2";
pub const L3_KEY: &str = "L3";

/// The L1/L2/L3 label triple of one historical complaint.
///
/// The three levels are only ever constructed together, from the same
/// source row, so a retrieved triple can never mix levels from different
/// complaints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProblemCodes {
    #[serde(rename = "L1")]
    pub l1: String,
    #[serde(rename = "L2")]
    pub l2: String,
    #[serde(rename = "L3")]
    pub l3: String,
}

impl ProblemCodes {
    pub fn new(l1: impl Into<String>, l2: impl Into<String>, l3: impl Into<String>) -> Self {
        Self {
            l1: l1.into(),
            l2: l2.into(),
            l3: l3.into(),
        }
    }

    /// Label pairs in display order
    pub fn entries(&self) -> [(&'static str, &str); 3] {
        [
            (L1_KEY, self.l1.as_str()),
            (L2_KEY, self.l2.as_str()),
            (L3_KEY, self.l3.as_str()),
        ]
    }

    /// Render as `key: value` lines
    pub fn to_lines(&self) -> String {
        self.entries()
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One ingested complaint.
///
/// `index` is the dense row position assigned at ingestion, starting at 0;
/// the string id is its decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub index: u64,
    pub description: String,
    pub codes: ProblemCodes,
}

impl ComplaintRecord {
    pub fn new(index: u64, description: impl Into<String>, codes: ProblemCodes) -> Self {
        Self {
            index,
            description: description.into(),
            codes,
        }
    }

    /// Stable string id
    pub fn id(&self) -> String {
        self.index.to_string()
    }
}

/// A complaint returned by a similarity query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredComplaint {
    pub id: String,
    pub score: f32,
    pub document: String,
    pub codes: ProblemCodes,
}

impl ScoredComplaint {
    /// Document text followed by its label lines
    pub fn to_block(&self) -> String {
        format!("{}\n{}", self.document, self.codes.to_lines())
    }
}
