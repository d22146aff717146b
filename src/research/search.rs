//! Web search client
//!
//! Tavily-backed search collaborator behind the `SearchClient` trait. Each
//! pipeline query becomes one search call returning titled URLs.

use crate::config::SearchConfig;
use crate::error::AppError;
use async_trait::async_trait;
use serde::Deserialize;

/// Results returned per search query
const MAX_SEARCH_RESULTS: u32 = 8;

/// One search result
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Result title
    pub title: String,
    /// Result URL
    pub url: String,
}

/// Search collaborator: one query in, an ordered list of hits out.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Search the web for `query`
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, AppError>;
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    url: String,
}

/// Tavily JSON search API client
pub struct TavilySearch {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TavilySearch {
    /// Build a client from configuration, reusing the shared HTTP client
    pub fn new(client: reqwest::Client, config: &SearchConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        }
    }
}

#[async_trait]
impl SearchClient for TavilySearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, AppError> {
        if self.api_key.is_empty() {
            return Err(AppError::Retrieval(
                "TAVILY_API_KEY is not set or is empty".to_string(),
            ));
        }

        let url = format!("{}/search", self.base_url);
        let body = serde_json::json!({
            "api_key": self.api_key,
            "query": query,
            "max_results": MAX_SEARCH_RESULTS,
            "include_answer": false,
        });

        tracing::debug!(query = %query, "Calling search API");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Retrieval(format!("search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let err_body = response.text().await.unwrap_or_default();
            return Err(AppError::Retrieval(format!(
                "search API returned HTTP {}: {}",
                status.as_u16(),
                err_body
            )));
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| AppError::Retrieval(format!("failed to parse search response: {}", e)))?;

        let hits = parsed
            .results
            .into_iter()
            .filter(|r| !r.url.is_empty())
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
            })
            .collect::<Vec<_>>();

        tracing::debug!(query = %query, hits = hits.len(), "Search completed");
        Ok(hits)
    }
}
