//! Feedback generation — pluggable, trait-based seam over the model call.
//!
//! `AppState` holds an `Arc<dyn FeedbackGenerator>`; production uses
//! `LlmFeedbackGenerator`, tests substitute stubs so the pipeline runs
//! without network.

use async_trait::async_trait;
use thiserror::Error;

use crate::feedback::prompts::{FEEDBACK_PROMPT_TEMPLATE, FEEDBACK_SYSTEM};
use crate::feedback::schema::FeedbackDraft;
use crate::llm_client::{LlmClient, LlmError};

/// Feedback drafts are bounded (five category scores plus a short
/// assessment), so the completion is capped well below the client default.
const FEEDBACK_MAX_TOKENS: u32 = 2048;

/// Why a draft could not be produced.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("draft failed validation: {0}")]
    Schema(String),
}

#[async_trait]
pub trait FeedbackGenerator: Send + Sync {
    /// Scores a formatted transcript into a structured draft. The draft is
    /// NOT yet schema-validated; the pipeline validates before persisting.
    async fn generate(&self, formatted_transcript: &str)
        -> Result<FeedbackDraft, GenerationError>;
}

/// Production generator: one structured-output model call, no retry beyond
/// what the client does for transport-level failures.
pub struct LlmFeedbackGenerator(LlmClient);

impl LlmFeedbackGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self(llm.with_max_tokens(FEEDBACK_MAX_TOKENS))
    }
}

#[async_trait]
impl FeedbackGenerator for LlmFeedbackGenerator {
    async fn generate(
        &self,
        formatted_transcript: &str,
    ) -> Result<FeedbackDraft, GenerationError> {
        let prompt = FEEDBACK_PROMPT_TEMPLATE.replace("{transcript}", formatted_transcript);
        let draft = self
            .0
            .call_json::<FeedbackDraft>(&prompt, FEEDBACK_SYSTEM)
            .await?;
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_failure_converts_with_context() {
        let err: GenerationError = LlmError::EmptyContent.into();
        assert!(matches!(err, GenerationError::Model(_)));
        assert!(err.to_string().starts_with("model call failed"));
    }

    #[test]
    fn test_schema_variant_carries_violation_text() {
        let err = GenerationError::Schema("unrecognized category 'Charisma'".to_string());
        assert!(err.to_string().contains("Charisma"));
    }
}
