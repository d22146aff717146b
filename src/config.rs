//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// OpenAI-compatible model API configuration
    pub openai: OpenAiConfig,
    /// Web search API configuration
    pub search: SearchConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// OpenAI-compatible API configuration, shared by chat and embedding clients
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key (empty string if unset; clients reject calls with an empty key)
    pub api_key: String,
    /// Chat completion model name
    pub chat_model: String,
    /// Embedding model name
    pub embedding_model: String,
    /// API base URL (overridable for compatible gateways)
    pub base_url: String,
}

/// Search collaborator configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Tavily API key (empty string if unset)
    pub api_key: String,
    /// Search API base URL
    pub base_url: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8000),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            openai: OpenAiConfig {
                api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
                chat_model: env::var("OPENAI_CHAT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
                embedding_model: env::var("OPENAI_EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
                base_url: env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            },
            search: SearchConfig {
                api_key: env::var("TAVILY_API_KEY").unwrap_or_default(),
                base_url: env::var("TAVILY_BASE_URL")
                    .unwrap_or_else(|_| "https://api.tavily.com".to_string()),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
