//! Hosted chat-completion strategies.
//!
//! One type covers OpenAI, OpenAI-compatible vendors, and Anthropic; the
//! wire protocol differs but the prompt contract is identical.

use async_trait::async_trait;

use llm_client::{AnthropicClient, ChatRequest, Message, OpenAiClient};

use crate::error::{AnswerError, AnswerResult};

use super::context::assemble_context;
use super::{AnswerRequest, Answerer, StrategyAnswer};

/// Grounding rules shared by all hosted providers.
pub const SYSTEM_PROMPT: &str = "\
You are a helpful assistant that answers questions using only the provided web content.
Rules:
- Use only the supplied context. Do not draw on outside knowledge.
- Basic arithmetic is allowed only when both operands appear in the context.
- If the context does not contain the answer, say so explicitly: \"The provided content does not contain that information.\"
- When you combine information from multiple sources, state which sources you used.";

const MAX_ANSWER_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;
const HOSTED_CONFIDENCE: f32 = 0.8;

enum HostedBackend {
    OpenAi(OpenAiClient),
    Anthropic(AnthropicClient),
}

/// A hosted chat provider wired into the cascade.
pub struct HostedAnswerer {
    name: &'static str,
    model: String,
    backend: HostedBackend,
}

impl HostedAnswerer {
    /// OpenAI-backed strategy.
    pub fn openai(client: OpenAiClient, model: String) -> Self {
        Self {
            name: "openai",
            model,
            backend: HostedBackend::OpenAi(client),
        }
    }

    /// Strategy for an OpenAI-compatible vendor (custom base URL).
    pub fn openai_compatible(client: OpenAiClient, model: String) -> Self {
        Self {
            name: "openai-compatible",
            model,
            backend: HostedBackend::OpenAi(client),
        }
    }

    /// Anthropic-backed strategy.
    pub fn anthropic(client: AnthropicClient, model: String) -> Self {
        Self {
            name: "anthropic",
            model,
            backend: HostedBackend::Anthropic(client),
        }
    }
}

/// Build the conversation: system rules, recent history, then the grounded
/// question.
pub(crate) fn build_messages(request: &AnswerRequest) -> Vec<Message> {
    let mut messages = vec![Message::system(SYSTEM_PROMPT)];

    for entry in &request.history {
        messages.push(Message::user(entry.question.clone()));
        messages.push(Message::assistant(entry.answer.clone()));
    }

    let context = assemble_context(&request.context);
    messages.push(Message::user(format!(
        "Context:\n{}\n\nQuestion: {}",
        context, request.question
    )));

    messages
}

#[async_trait]
impl Answerer for HostedAnswerer {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn answer(&self, request: &AnswerRequest) -> AnswerResult<StrategyAnswer> {
        let chat_request = ChatRequest::new(self.model.clone())
            .messages(build_messages(request))
            .max_tokens(MAX_ANSWER_TOKENS)
            .temperature(TEMPERATURE);

        let response = match &self.backend {
            HostedBackend::OpenAi(client) => client.chat_completion(chat_request).await,
            HostedBackend::Anthropic(client) => client.create_message(chat_request).await,
        }
        .map_err(|e| AnswerError::Strategy {
            strategy: self.name,
            reason: e.to_string(),
        })?;

        let text = response.content.trim().to_string();
        if text.is_empty() {
            return Err(AnswerError::Strategy {
                strategy: self.name,
                reason: "empty completion".to_string(),
            });
        }

        Ok(StrategyAnswer {
            text,
            confidence: HOSTED_CONFIDENCE,
        })
    }
}
