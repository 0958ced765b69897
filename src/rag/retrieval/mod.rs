// Context retrieval from the complaint index
pub mod engine;

pub use engine::{ContextRetriever, DEFAULT_TOP_K};
