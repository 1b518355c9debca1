//! Retrieval: query embedding, nearest-neighbour search and result
//! normalization.

pub mod search;
pub mod types;

pub use search::RetrievalEngine;
pub use types::{SearchOptions, SearchResult, DEFAULT_TOP_K};
