//! Shared application state
//!
//! One `AppState` is built at startup and shared (behind `Arc`) between the
//! HTTP handlers and every spawned pipeline run. Collaborators are held as
//! trait objects so tests can wire in stubs.

use crate::llm::{ChatModel, EmbeddingModel};
use crate::pipeline::config::PipelineConfig;
use crate::research::{ContentFetcher, SearchClient};
use crate::state::TaskStore;
use std::sync::Arc;

/// Process-wide state: the task registry plus the external collaborators
pub struct AppState {
    /// Task registry, the pipeline's only side channel
    pub tasks: TaskStore,
    /// Retrieval/composition tunables
    pub pipeline: PipelineConfig,
    /// Language-model collaborator
    pub chat: Arc<dyn ChatModel>,
    /// Embedding collaborator
    pub embeddings: Arc<dyn EmbeddingModel>,
    /// Web search collaborator
    pub search: Arc<dyn SearchClient>,
    /// Page fetch/extraction collaborator
    pub fetcher: Arc<dyn ContentFetcher>,
}

impl AppState {
    /// Assemble application state from its collaborators
    pub fn new(
        pipeline: PipelineConfig,
        chat: Arc<dyn ChatModel>,
        embeddings: Arc<dyn EmbeddingModel>,
        search: Arc<dyn SearchClient>,
        fetcher: Arc<dyn ContentFetcher>,
    ) -> Self {
        Self {
            tasks: TaskStore::new(),
            pipeline,
            chat,
            embeddings,
            search,
            fetcher,
        }
    }
}
