//! Type definitions module
//!
//! Core records flowing through ingestion, retrieval and chat.

pub mod complaint;
pub mod messages;

// Re-export commonly used types
pub use complaint::{ComplaintRecord, ProblemCodes, ScoredComplaint};
pub use messages::{ChatTurn, Role};
