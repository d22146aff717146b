//! Web research collaborators and the relevance filter
//!
//! Search, page fetching, chunk filtering by embedding similarity, and
//! source presentation helpers.

pub mod fetch;
pub mod filter;
pub mod search;
pub mod site;

pub use fetch::{ContentFetcher, Document, PageFetcher};
pub use filter::{RelevanceFilter, ScoredChunk};
pub use search::{SearchClient, SearchHit, TavilySearch};
