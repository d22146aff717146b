//! Language-model collaborators
//!
//! Chat and embedding clients for OpenAI-compatible APIs, exposed to the
//! pipeline through the `ChatModel` and `EmbeddingModel` traits.

pub mod chat;
pub mod embeddings;
pub mod openai_types;

pub use chat::{ChatModel, OpenAiChat};
pub use embeddings::{EmbeddingModel, OpenAiEmbeddings};
