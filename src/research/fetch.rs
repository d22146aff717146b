//! Page fetching and text extraction
//!
//! Pulls the pages behind the collected search-result URLs and converts them
//! to plain text for chunking. A failing URL is dropped with a warning; one
//! dead link must not sink the whole context stage.

use crate::error::AppError;
use async_trait::async_trait;
use futures_util::future::join_all;

/// Maximum bytes downloaded per page
const MAX_DOWNLOAD_SIZE: usize = 5 * 1024 * 1024;

/// Maximum extracted characters kept per document
const MAX_DOCUMENT_CHARS: usize = 40_000;

/// A fetched document, pre-chunking
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Page title (falls back to the URL when the page has none)
    pub title: String,
    /// Extracted plain text
    pub content: String,
    /// The URL the document was fetched from
    pub source_url: String,
}

/// Content-fetch collaborator: URLs in, extracted documents out.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch and extract every reachable URL; unreachable ones are skipped.
    async fn fetch_and_extract(&self, urls: &[String]) -> Result<Vec<Document>, AppError>;
}

/// reqwest-backed page fetcher with HTML-to-text extraction
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    /// Build a fetcher reusing the shared HTTP client
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_one(&self, url: &str) -> Result<Document, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status.as_u16()));
        }

        if let Some(length) = response.content_length() {
            if length > MAX_DOWNLOAD_SIZE as u64 {
                return Err(format!("content too large: {} bytes", length));
            }
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| format!("failed to read body: {}", e))?;
        if bytes.len() > MAX_DOWNLOAD_SIZE {
            return Err(format!("content too large: {} bytes", bytes.len()));
        }

        let body = String::from_utf8_lossy(&bytes).to_string();
        let (title, content) =
            if content_type.contains("text/html") || content_type.contains("application/xhtml") {
                (extract_title(&body), html2md::parse_html(&body))
            } else if content_type.is_empty() || content_type.contains("text/") {
                (None, body)
            } else {
                return Err(format!("unsupported content type: {}", content_type));
            };

        let content = truncate_chars(&content, MAX_DOCUMENT_CHARS);
        if content.trim().is_empty() {
            return Err("no extractable text".to_string());
        }

        Ok(Document {
            title: title.unwrap_or_else(|| url.to_string()),
            content,
            source_url: url.to_string(),
        })
    }
}

#[async_trait]
impl ContentFetcher for PageFetcher {
    async fn fetch_and_extract(&self, urls: &[String]) -> Result<Vec<Document>, AppError> {
        // The union of all queries' results can repeat URLs; fetch each once.
        let mut unique: Vec<&String> = Vec::new();
        for url in urls {
            if !unique.contains(&url) {
                unique.push(url);
            }
        }

        let fetches = unique.iter().map(|url| async move {
            match self.fetch_one(url).await {
                Ok(doc) => Some(doc),
                Err(reason) => {
                    tracing::warn!(url = %url, reason = %reason, "Dropping unfetchable source");
                    None
                }
            }
        });

        let documents: Vec<Document> = join_all(fetches).await.into_iter().flatten().collect();
        tracing::debug!(
            requested = urls.len(),
            fetched = documents.len(),
            "Fetched source documents"
        );
        Ok(documents)
    }
}

/// Pull the contents of the first `<title>` element, if any.
fn extract_title(html: &str) -> Option<String> {
    let lower = html.to_lowercase();
    let start = lower.find("<title")?;
    let open_end = lower[start..].find('>')? + start + 1;
    let close = lower[open_end..].find("</title>")? + open_end;
    let title = html[open_end..close].trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Truncate to at most `max` characters on a char boundary.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serial_test::serial;

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title>Coffee History</title></head><body>x</body></html>";
        assert_eq!(extract_title(html), Some("Coffee History".to_string()));
    }

    #[test]
    fn test_extract_title_missing() {
        assert_eq!(extract_title("<html><body>x</body></html>"), None);
    }

    #[test]
    fn test_extract_title_with_attributes() {
        let html = r#"<title lang="en"> Spaced </title>"#;
        assert_eq!(extract_title(html), Some("Spaced".to_string()));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
    }

    #[tokio::test]
    #[serial]
    async fn test_fetch_extracts_html_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><head><title>T</title></head><body><p>Coffee is old.</p></body></html>")
            .create_async()
            .await;

        let fetcher = PageFetcher::new(reqwest::Client::new());
        let url = format!("{}/page", server.url());
        let docs = fetcher.fetch_and_extract(&[url.clone()]).await.unwrap();

        mock.assert_async().await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "T");
        assert!(docs[0].content.contains("Coffee is old."));
        assert_eq!(docs[0].source_url, url);
    }

    #[tokio::test]
    #[serial]
    async fn test_fetch_drops_failing_urls() {
        let mut server = Server::new_async().await;
        let ok = server
            .mock("GET", "/good")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body>good text here</body></html>")
            .create_async()
            .await;
        let bad = server
            .mock("GET", "/bad")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = PageFetcher::new(reqwest::Client::new());
        let urls = vec![
            format!("{}/good", server.url()),
            format!("{}/bad", server.url()),
        ];
        let docs = fetcher.fetch_and_extract(&urls).await.unwrap();

        ok.assert_async().await;
        bad.assert_async().await;
        assert_eq!(docs.len(), 1);
        assert!(docs[0].source_url.ends_with("/good"));
    }

    #[tokio::test]
    #[serial]
    async fn test_fetch_deduplicates_urls() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("plain text content")
            .expect(1)
            .create_async()
            .await;

        let fetcher = PageFetcher::new(reqwest::Client::new());
        let url = format!("{}/page", server.url());
        let docs = fetcher
            .fetch_and_extract(&[url.clone(), url.clone()])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(docs.len(), 1);
    }
}
