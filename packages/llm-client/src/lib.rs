//! REST clients for model backends.
//!
//! A thin, provider-by-provider client layer with no domain logic. Each
//! module wraps one wire protocol:
//!
//! - [`openai`] - OpenAI-style chat completions (also covers any
//!   OpenAI-compatible vendor via a base-URL override)
//! - [`anthropic`] - Anthropic messages API
//! - [`ollama`] - local Ollama generation endpoint, with a reachability probe
//! - [`huggingface`] - Hugging Face hosted inference (extractive QA task)
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_client::{ChatRequest, Message, OpenAiClient};
//!
//! let client = OpenAiClient::from_env()?;
//! let response = client
//!     .chat_completion(
//!         ChatRequest::new("gpt-4o-mini")
//!             .message(Message::system("You are a helpful assistant"))
//!             .message(Message::user("Hello!"))
//!             .max_tokens(500),
//!     )
//!     .await?;
//! println!("{}", response.content);
//! ```

pub mod anthropic;
pub mod error;
pub mod huggingface;
pub mod ollama;
pub mod openai;
pub mod types;

pub use anthropic::AnthropicClient;
pub use error::{LlmError, Result};
pub use huggingface::{HfInferenceClient, QaAnswer};
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use types::{ChatRequest, ChatResponse, Message};
