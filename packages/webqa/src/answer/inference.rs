//! Hosted inference strategy (Hugging Face QA task).
//!
//! The QA models take a question plus a tight context window, so the
//! assembled context is hard-truncated well below the chat providers'
//! budget.

use async_trait::async_trait;

use llm_client::HfInferenceClient;

use crate::error::{AnswerError, AnswerResult};

use super::context::{assemble_context, cap_chars};
use super::{AnswerRequest, Answerer, StrategyAnswer};

/// Hard cap on the context handed to the QA model.
const INFERENCE_CONTEXT_CHARS: usize = 1000;

const INFERENCE_CONFIDENCE: f32 = 0.7;

/// Answers through the hosted extractive-QA endpoint.
pub struct HfAnswerer {
    client: HfInferenceClient,
}

impl HfAnswerer {
    /// Create the strategy for the given client.
    pub fn new(client: HfInferenceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Answerer for HfAnswerer {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    async fn answer(&self, request: &AnswerRequest) -> AnswerResult<StrategyAnswer> {
        let context = cap_chars(&assemble_context(&request.context), INFERENCE_CONTEXT_CHARS);

        let result = self
            .client
            .question_answering(&request.question, &context)
            .await
            .map_err(|e| AnswerError::Strategy {
                strategy: "huggingface",
                reason: e.to_string(),
            })?;

        Ok(StrategyAnswer {
            text: result.answer,
            confidence: INFERENCE_CONFIDENCE,
        })
    }
}
