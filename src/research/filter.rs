//! Relevance filtering
//!
//! Splits fetched documents into bounded overlapping windows, embeds them,
//! and keeps the windows most similar to the retrieval query. The threshold
//! is a precision gate; the result cap bounds downstream prompt growth. Both
//! are independently tunable in `PipelineConfig`.

use crate::error::AppError;
use crate::llm::EmbeddingModel;
use crate::pipeline::config::PipelineConfig;
use crate::research::fetch::Document;
use futures_util::future::join_all;

/// A chunk that survived the similarity gate
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    /// Title of the source document
    pub title: String,
    /// The window text
    pub content: String,
    /// URL of the source document
    pub source_url: String,
    /// Cosine similarity against the query embedding
    pub score: f32,
}

/// Similarity-based chunk filter
pub struct RelevanceFilter {
    chunk_size: usize,
    chunk_overlap: usize,
    similarity_threshold: f32,
    max_results: usize,
}

impl RelevanceFilter {
    /// Build a filter from the pipeline tunables
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            similarity_threshold: config.similarity_threshold,
            max_results: config.max_context_results,
        }
    }

    /// Return up to `max_results` chunks whose similarity to `query` exceeds
    /// the threshold, ordered by similarity descending.
    ///
    /// A chunk whose embedding call fails is dropped with a warning; the
    /// query embedding is load-bearing, so its failure aborts the pass.
    pub async fn filter(
        &self,
        embeddings: &dyn EmbeddingModel,
        query: &str,
        documents: &[Document],
    ) -> Result<Vec<ScoredChunk>, AppError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = embeddings
            .embed(query)
            .await
            .map_err(|e| AppError::Retrieval(format!("query embedding failed: {}", e)))?;

        let windows: Vec<(&Document, String)> = documents
            .iter()
            .flat_map(|doc| {
                split_text(&doc.content, self.chunk_size, self.chunk_overlap)
                    .into_iter()
                    .map(move |window| (doc, window))
            })
            .collect();

        let embedded = join_all(
            windows
                .iter()
                .map(|(_, window)| embeddings.embed(window)),
        )
        .await;

        let mut scored: Vec<ScoredChunk> = windows
            .into_iter()
            .zip(embedded)
            .filter_map(|((doc, window), vector)| match vector {
                Ok(vector) => {
                    let score = cosine_similarity(&query_vector, &vector);
                    (score > self.similarity_threshold).then(|| ScoredChunk {
                        title: doc.title.clone(),
                        content: window,
                        source_url: doc.source_url.clone(),
                        score,
                    })
                }
                Err(e) => {
                    tracing::warn!(
                        source_url = %doc.source_url,
                        error = %e,
                        "Dropping chunk with failed embedding"
                    );
                    None
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.max_results);

        tracing::debug!(
            kept = scored.len(),
            threshold = self.similarity_threshold,
            "Relevance filter pass completed"
        );
        Ok(scored)
    }
}

/// Split text into overlapping windows of at most `size` characters.
///
/// Consecutive windows share `overlap` characters so a fact straddling a
/// boundary still lands whole in one of them.
pub fn split_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    assert!(overlap < size, "overlap must be smaller than window size");
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let step = size - overlap;
    let mut windows = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + size).min(chars.len());
        let window: String = chars[start..end].iter().collect();
        if !window.trim().is_empty() {
            windows.push(window);
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }
    windows
}

/// Cosine similarity between two vectors, in [-1, 1].
///
/// Returns 0.0 for degenerate (near-zero magnitude or mismatched) inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    const EPSILON: f32 = 1e-10;
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a < EPSILON || magnitude_b < EPSILON {
        return 0.0;
    }

    (dot / (magnitude_a * magnitude_b)).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Embedding stub mapping known texts to fixed vectors
    struct KeyedEmbeddings {
        fail_on: Option<String>,
    }

    #[async_trait]
    impl EmbeddingModel for KeyedEmbeddings {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
            if let Some(marker) = &self.fail_on {
                if text.contains(marker.as_str()) {
                    return Err(AppError::Embedding("stub failure".to_string()));
                }
            }
            // Texts mentioning coffee align with the query axis; others are
            // orthogonal to it.
            if text.contains("coffee") {
                Ok(vec![1.0, 0.0])
            } else {
                Ok(vec![0.0, 1.0])
            }
        }
    }

    fn doc(content: &str, url: &str) -> Document {
        Document {
            title: "t".to_string(),
            content: content.to_string(),
            source_url: url.to_string(),
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            chunk_size: 50,
            chunk_overlap: 10,
            similarity_threshold: 0.78,
            max_context_results: 2,
        }
    }

    #[test]
    fn test_split_text_respects_size_and_overlap() {
        let text: String = "abcdefghij".repeat(3); // 30 chars
        let windows = split_text(&text, 12, 4);
        assert!(windows.iter().all(|w| w.chars().count() <= 12));
        // Step is 8, so windows start at 0, 8, 16, 24.
        assert_eq!(windows.len(), 4);
        assert_eq!(&windows[0][8..12], &windows[1][0..4]);
    }

    #[test]
    fn test_split_text_short_input_is_single_window() {
        let windows = split_text("short", 100, 10);
        assert_eq!(windows, vec!["short".to_string()]);
    }

    #[test]
    fn test_split_text_empty_input() {
        assert!(split_text("", 100, 10).is_empty());
    }

    #[test]
    fn test_cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_filter_keeps_only_chunks_above_threshold() {
        let embeddings = KeyedEmbeddings { fail_on: None };
        let documents = vec![
            doc("coffee beans and coffee roasting", "https://a.example"),
            doc("submarine navigation principles", "https://b.example"),
        ];
        let filter = RelevanceFilter::new(&config());
        let kept = filter
            .filter(&embeddings, "coffee", &documents)
            .await
            .unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source_url, "https://a.example");
        assert!(kept[0].score > 0.78);
    }

    #[tokio::test]
    async fn test_filter_caps_result_count() {
        let embeddings = KeyedEmbeddings { fail_on: None };
        let documents = vec![
            doc("coffee one", "https://a.example"),
            doc("coffee two", "https://b.example"),
            doc("coffee three", "https://c.example"),
        ];
        let filter = RelevanceFilter::new(&config());
        let kept = filter
            .filter(&embeddings, "coffee", &documents)
            .await
            .unwrap();
        assert_eq!(kept.len(), 2); // max_context_results
    }

    #[tokio::test]
    async fn test_filter_drops_chunk_on_embedding_failure() {
        let embeddings = KeyedEmbeddings {
            fail_on: Some("roasting".to_string()),
        };
        let documents = vec![
            doc("coffee history", "https://a.example"),
            doc("coffee roasting", "https://b.example"),
        ];
        let filter = RelevanceFilter::new(&config());
        let kept = filter
            .filter(&embeddings, "coffee", &documents)
            .await
            .unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source_url, "https://a.example");
    }

    #[tokio::test]
    async fn test_filter_fails_when_query_embedding_fails() {
        let embeddings = KeyedEmbeddings {
            fail_on: Some("coffee".to_string()),
        };
        let documents = vec![doc("anything", "https://a.example")];
        let filter = RelevanceFilter::new(&config());
        let result = filter.filter(&embeddings, "coffee", &documents).await;
        assert!(result.unwrap_err().to_string().contains("query embedding"));
    }

    #[tokio::test]
    async fn test_filter_empty_documents_is_empty_and_free() {
        // Embedding the query for zero documents would be wasted work; the
        // stub would fail on it, proving it is never called.
        let embeddings = KeyedEmbeddings {
            fail_on: Some("coffee".to_string()),
        };
        let filter = RelevanceFilter::new(&config());
        let kept = filter.filter(&embeddings, "coffee", &[]).await.unwrap();
        assert!(kept.is_empty());
    }
}
