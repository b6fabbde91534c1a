//! uniguide-index
//!
//! In-memory semantic index over corpus chunks. `EmbeddingIndex` is built once
//! at startup, then serves concurrent `retrieve` calls; query embeddings go
//! through a bounded LRU (`cache`).
pub mod cache;
pub mod search;
pub mod similarity;

pub use cache::{CacheStats, QueryEmbeddingCache};
pub use search::{CorpusIndex, EmbeddingIndex, ScoredChunk};
pub use similarity::cosine_similarity;
