//! OpenAI chat API types
//!
//! Structs that mirror the chat-completions JSON request/response format.
//! Used to serialize requests and deserialize API responses into typed Rust
//! structs.

use serde::{Deserialize, Serialize};

/// Request body for the chat-completions endpoint
#[derive(Serialize, Debug)]
pub struct ChatRequest {
    /// Model name (e.g., "gpt-4o")
    pub model: String,
    /// Conversation messages; this client always sends a single user message
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature; omitted to use the model default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A single chat message
#[derive(Serialize, Deserialize, Debug)]
pub struct ChatMessage {
    /// Message role ("user", "assistant", ...)
    pub role: String,
    /// Message text
    pub content: String,
}

/// Top-level chat-completions response
#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    /// Candidate completions; the first is used
    pub choices: Vec<ChatChoice>,
}

/// A single completion choice
#[derive(Deserialize, Debug)]
pub struct ChatChoice {
    /// The generated message
    pub message: ChatMessage,
    /// Why generation stopped (if reported)
    #[serde(default)]
    #[allow(dead_code)] // Part of API response format, may be used in future
    pub finish_reason: Option<String>,
}

/// Structured error payload returned by the API on failure
#[derive(Deserialize, Debug)]
pub struct ApiErrorResponse {
    /// Error details
    pub error: Option<ApiErrorDetail>,
}

/// Error detail within an API error payload
#[derive(Deserialize, Debug)]
pub struct ApiErrorDetail {
    /// Human-readable error message
    pub message: Option<String>,
}
