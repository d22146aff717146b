//! Pipeline configuration
//!
//! Centralized tunables for the retrieval and composition stages.

/// Pipeline tunables
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Chunk window size in characters
    pub chunk_size: usize,
    /// Characters shared between consecutive windows
    pub chunk_overlap: usize,
    /// Minimum cosine similarity for a chunk to be kept (precision gate)
    pub similarity_threshold: f32,
    /// Maximum context chunks kept per task, bounding downstream prompt growth
    pub max_context_results: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1200,
            chunk_overlap: 100,
            similarity_threshold: 0.78,
            max_context_results: 5,
        }
    }
}
