//! Chat model client
//!
//! Direct HTTP client for an OpenAI-compatible chat-completions API. The
//! pipeline consumes the `ChatModel` trait so tests can substitute scripted
//! stubs for the network client.

use crate::config::OpenAiConfig;
use crate::error::AppError;
use crate::llm::openai_types::{ApiErrorResponse, ChatMessage, ChatRequest, ChatResponse};
use async_trait::async_trait;

/// Language-model invocation: one prompt in, one text completion out.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a completion for `prompt`.
    ///
    /// `temperature` of `None` uses the model default; structured generation
    /// passes a diversity-favoring value on its first attempt only.
    async fn generate(&self, prompt: &str, temperature: Option<f32>) -> Result<String, AppError>;
}

/// Chat-completions client for OpenAI-compatible APIs
pub struct OpenAiChat {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiChat {
    /// Build a client from configuration, reusing the shared HTTP client
    pub fn new(client: reqwest::Client, config: &OpenAiConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            model: config.chat_model.clone(),
            base_url: config.base_url.clone(),
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn generate(&self, prompt: &str, temperature: Option<f32>) -> Result<String, AppError> {
        if self.api_key.is_empty() {
            return Err(AppError::Generation(
                "OPENAI_API_KEY is not set or is empty".to_string(),
            ));
        }

        let url = format!("{}/chat/completions", self.base_url);
        let request_body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature,
        };

        tracing::debug!(
            url = %url,
            model = %self.model,
            temperature = ?temperature,
            prompt_len = prompt.len(),
            "Calling chat API"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::Generation(format!("chat API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .and_then(|e| e.message)
                .unwrap_or(body);

            tracing::error!(
                status_code = status.as_u16(),
                detail = %detail,
                "Chat API returned error status"
            );

            return Err(AppError::Generation(format!(
                "chat API returned HTTP {}: {}",
                status.as_u16(),
                detail
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("failed to parse chat response: {}", e)))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::Generation("chat response contains no choices".to_string()))?;

        if text.is_empty() {
            return Err(AppError::Generation("chat response text is empty".to_string()));
        }

        tracing::debug!(response_len = text.len(), "Chat API call succeeded");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serial_test::serial;

    fn test_config(base_url: &str, api_key: &str) -> OpenAiConfig {
        OpenAiConfig {
            api_key: api_key.to_string(),
            chat_model: "gpt-4o".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            base_url: base_url.to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_api_key_is_rejected() {
        let chat = OpenAiChat::new(reqwest::Client::new(), &test_config("http://unused", ""));
        let result = chat.generate("hello", None).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("OPENAI_API_KEY"));
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(
                r#"{
                    "choices": [{
                        "message": {"role": "assistant", "content": "a poem"},
                        "finish_reason": "stop"
                    }]
                }"#,
            )
            .create_async()
            .await;

        let chat = OpenAiChat::new(
            reqwest::Client::new(),
            &test_config(&server.url(), "test-key"),
        );
        let result = chat.generate("write a poem", Some(1.0)).await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), "a poem");
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_http_error_surfaces_detail() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error": {"message": "Rate limit reached"}}"#)
            .create_async()
            .await;

        let chat = OpenAiChat::new(
            reqwest::Client::new(),
            &test_config(&server.url(), "test-key"),
        );
        let result = chat.generate("prompt", None).await;

        mock.assert_async().await;
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("429"));
        assert!(msg.contains("Rate limit reached"));
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_empty_choices_is_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let chat = OpenAiChat::new(
            reqwest::Client::new(),
            &test_config(&server.url(), "test-key"),
        );
        let result = chat.generate("prompt", None).await;

        mock.assert_async().await;
        assert!(result.unwrap_err().to_string().contains("no choices"));
    }

    #[tokio::test]
    #[serial]
    async fn test_generate_invalid_json_is_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let chat = OpenAiChat::new(
            reqwest::Client::new(),
            &test_config(&server.url(), "test-key"),
        );
        let result = chat.generate("prompt", None).await;

        mock.assert_async().await;
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("failed to parse chat response"));
    }
}
