//! The answer cascade.
//!
//! A prioritized list of [`Answerer`] strategies tried strictly in order:
//! hosted chat providers, then a local model, then hosted inference, ending
//! in the deterministic extractive answerer, which always succeeds. Each
//! strategy runs under its own timeout and its failure only advances the
//! chain, never aborts it.

pub mod context;
pub mod extractive;
pub mod hosted;
pub mod inference;
pub mod local;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{AnswerError, AnswerResult};
use crate::types::{QAEntry, ScoredChunk};

use llm_client::{AnthropicClient, HfInferenceClient, OllamaClient, OpenAiClient};

/// Everything a strategy needs to answer one question.
#[derive(Debug, Clone)]
pub struct AnswerRequest {
    /// The question as asked
    pub question: String,

    /// Session the question belongs to
    pub session_id: String,

    /// Relevant chunks selected for this question
    pub context: Vec<ScoredChunk>,

    /// Recent conversation window, oldest first
    pub history: Vec<QAEntry>,
}

/// A strategy's successful result.
#[derive(Debug, Clone)]
pub struct StrategyAnswer {
    /// Answer text
    pub text: String,

    /// Rough confidence of this strategy class
    pub confidence: f32,
}

/// One answering strategy in the cascade.
#[async_trait]
pub trait Answerer: Send + Sync {
    /// Strategy name, for logs.
    fn name(&self) -> &'static str;

    /// Whether the strategy is configured at all. Runtime reachability is
    /// checked inside [`Answerer::answer`] and reported as
    /// [`AnswerError::Unavailable`].
    fn is_available(&self) -> bool {
        true
    }

    /// Attempt to answer. Errors are recovered by the cascade.
    async fn answer(&self, request: &AnswerRequest) -> AnswerResult<StrategyAnswer>;
}

/// Per-strategy wall-clock budget.
const STRATEGY_TIMEOUT: Duration = Duration::from_secs(30);

/// Ordered first-success chain of answering strategies.
pub struct AnswerCascade {
    strategies: Vec<Arc<dyn Answerer>>,
}

impl AnswerCascade {
    /// Build a cascade from an explicit strategy list.
    pub fn new(strategies: Vec<Arc<dyn Answerer>>) -> Self {
        Self { strategies }
    }

    /// Build the standard chain from settings.
    ///
    /// At most one hosted chat provider enters the chain (OpenAI, else
    /// Anthropic, else a compatible vendor); the local model is considered
    /// only when no hosted provider is configured; the extractive answerer
    /// is always the final entry.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut strategies: Vec<Arc<dyn Answerer>> = Vec::new();

        if let Some(key) = &settings.openai_api_key {
            strategies.push(Arc::new(hosted::HostedAnswerer::openai(
                OpenAiClient::new(key.expose()),
                settings.openai_model.clone(),
            )));
        } else if let Some(key) = &settings.anthropic_api_key {
            strategies.push(Arc::new(hosted::HostedAnswerer::anthropic(
                AnthropicClient::new(key.expose()),
                settings.anthropic_model.clone(),
            )));
        } else if let (Some(base), Some(key)) =
            (&settings.compat_api_base, &settings.compat_api_key)
        {
            strategies.push(Arc::new(hosted::HostedAnswerer::openai_compatible(
                OpenAiClient::new(key.expose()).with_base_url(base.clone()),
                settings.compat_model.clone(),
            )));
        }

        if !settings.hosted_provider_configured() && settings.use_ollama {
            strategies.push(Arc::new(local::OllamaAnswerer::new(
                OllamaClient::new(settings.ollama_base_url.clone()),
                settings.ollama_model.clone(),
            )));
        }

        if settings.use_huggingface {
            let key = settings
                .huggingface_api_key
                .as_ref()
                .map(|k| k.expose().to_string());
            let mut client = HfInferenceClient::new(key);
            if let Some(model) = &settings.huggingface_qa_model {
                client = client.with_model(model);
            }
            strategies.push(Arc::new(inference::HfAnswerer::new(client)));
        }

        strategies.push(Arc::new(extractive::ExtractiveAnswerer));

        Self { strategies }
    }

    /// Names of the configured strategies, in order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run strategies in order and return the first success.
    ///
    /// Only returns an error if every strategy fails, which cannot happen
    /// while the extractive answerer terminates the chain.
    pub async fn run(&self, request: &AnswerRequest) -> AnswerResult<StrategyAnswer> {
        for strategy in &self.strategies {
            if !strategy.is_available() {
                debug!(strategy = strategy.name(), "strategy not configured, skipping");
                continue;
            }

            match tokio::time::timeout(STRATEGY_TIMEOUT, strategy.answer(request)).await {
                Err(_) => {
                    warn!(strategy = strategy.name(), "strategy timed out, trying next");
                }
                Ok(Err(AnswerError::Unavailable(name))) => {
                    debug!(strategy = name, "strategy unavailable, trying next");
                }
                Ok(Err(e)) => {
                    warn!(strategy = strategy.name(), error = %e, "strategy failed, trying next");
                }
                Ok(Ok(answer)) => {
                    info!(
                        strategy = strategy.name(),
                        confidence = answer.confidence,
                        "question answered"
                    );
                    return Ok(answer);
                }
            }
        }

        Err(AnswerError::Exhausted)
    }
}
