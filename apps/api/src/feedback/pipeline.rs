//! The feedback pipeline: format → generate → validate → persist.
//!
//! Every failure is caught at this boundary and turned into a
//! `{success: false, error}` result. There is no automatic retry and no
//! partial persistence: a draft that fails schema validation never reaches
//! the store. The caller (front end) surfaces the error and lets the user
//! re-invoke.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::feedback::generate::{FeedbackGenerator, GenerationError};
use crate::feedback::schema::validate_draft;
use crate::feedback::transcript::format_transcript;
use crate::models::feedback::{CategoryScore, Feedback, NewFeedback, TranscriptTurn};
use crate::store::{DocumentStore, StoreError};

#[derive(Debug, Error)]
enum PipelineError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackParams {
    pub interview_id: Uuid,
    pub user_id: String,
    pub transcript: Vec<TranscriptTurn>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs the full pipeline for one interview/user pair. Appends a new record
/// on every successful run — re-invocation produces a second record; callers
/// wanting at-most-one must check `lookup` first.
pub async fn create_feedback(
    store: &Arc<dyn DocumentStore>,
    generator: &Arc<dyn FeedbackGenerator>,
    params: &CreateFeedbackParams,
) -> CreateFeedbackResult {
    match run(store, generator, params).await {
        Ok(feedback_id) => {
            info!(
                "Stored feedback {feedback_id} for interview {} / user {}",
                params.interview_id, params.user_id
            );
            CreateFeedbackResult {
                success: true,
                feedback_id: Some(feedback_id),
                error: None,
            }
        }
        Err(e) => {
            error!("Feedback pipeline failed: {e}");
            CreateFeedbackResult {
                success: false,
                feedback_id: None,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Feedback lookup by (interview, user). Among duplicate records the first
/// match is returned.
pub async fn lookup(
    store: &Arc<dyn DocumentStore>,
    interview_id: Uuid,
    user_id: &str,
) -> Result<Option<Feedback>, StoreError> {
    store.feedback_for_interview(interview_id, user_id).await
}

async fn run(
    store: &Arc<dyn DocumentStore>,
    generator: &Arc<dyn FeedbackGenerator>,
    params: &CreateFeedbackParams,
) -> Result<Uuid, PipelineError> {
    let formatted = format_transcript(&params.transcript);

    let draft = generator.generate(&formatted).await?;
    validate_draft(&draft).map_err(GenerationError::Schema)?;

    // Rename the model's category/feedback fields to the storage schema's
    // name/comment, positionally, and stamp creation time.
    let category_scores: Vec<CategoryScore> = draft
        .category_scores
        .into_iter()
        .map(|c| CategoryScore {
            name: c.category,
            score: c.score,
            comment: c.feedback,
        })
        .collect();

    let feedback_id = store
        .add_feedback(&NewFeedback {
            interview_id: params.interview_id,
            user_id: params.user_id.clone(),
            total_score: draft.total_score,
            category_scores,
            strengths: draft.strengths,
            areas_for_improvement: draft.areas_for_improvement,
            final_assessment: draft.final_assessment,
            created_at: Utc::now(),
        })
        .await?;

    Ok(feedback_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::feedback::schema::{DraftCategoryScore, FeedbackDraft, FEEDBACK_CATEGORIES};
    use crate::llm_client::LlmError;
    use crate::store::MemoryStore;

    /// Returns a fixed draft and records the transcript it was handed.
    struct StubGenerator {
        draft: FeedbackDraft,
        seen: Mutex<Vec<String>>,
    }

    impl StubGenerator {
        fn new(draft: FeedbackDraft) -> Self {
            Self {
                draft,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl FeedbackGenerator for StubGenerator {
        async fn generate(
            &self,
            formatted_transcript: &str,
        ) -> Result<FeedbackDraft, GenerationError> {
            self.seen
                .lock()
                .unwrap()
                .push(formatted_transcript.to_string());
            Ok(self.draft.clone())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl FeedbackGenerator for FailingGenerator {
        async fn generate(
            &self,
            _formatted_transcript: &str,
        ) -> Result<FeedbackDraft, GenerationError> {
            Err(GenerationError::Model(LlmError::EmptyContent))
        }
    }

    fn valid_draft() -> FeedbackDraft {
        FeedbackDraft {
            total_score: 81,
            category_scores: FEEDBACK_CATEGORIES
                .iter()
                .enumerate()
                .map(|(i, name)| DraftCategoryScore {
                    category: name.to_string(),
                    score: 75 + i as i32,
                    feedback: format!("Notes on {name}."),
                })
                .collect(),
            strengths: vec!["Structured answers".to_string()],
            areas_for_improvement: vec!["Edge-case analysis".to_string()],
            final_assessment: "Strong performance overall.".to_string(),
        }
    }

    fn params() -> CreateFeedbackParams {
        CreateFeedbackParams {
            interview_id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            transcript: vec![TranscriptTurn {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_persist_renames_fields_positionally() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let draft = valid_draft();
        let generator: Arc<dyn FeedbackGenerator> =
            Arc::new(StubGenerator::new(draft.clone()));
        let params = params();

        let result = create_feedback(&store, &generator, &params).await;
        assert!(result.success);
        assert!(result.error.is_none());

        let stored = lookup(&store, params.interview_id, &params.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, result.feedback_id.unwrap());
        assert_eq!(stored.total_score, 81);
        assert_eq!(stored.category_scores.len(), 5);
        for (stored_score, draft_score) in
            stored.category_scores.iter().zip(&draft.category_scores)
        {
            assert_eq!(stored_score.name, draft_score.category);
            assert_eq!(stored_score.score, draft_score.score);
            assert_eq!(stored_score.comment, draft_score.feedback);
        }
    }

    #[tokio::test]
    async fn test_generator_receives_formatted_transcript() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let stub = Arc::new(StubGenerator::new(valid_draft()));
        let generator: Arc<dyn FeedbackGenerator> = stub.clone();

        create_feedback(&store, &generator, &params()).await;

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], "- user: hi\n");
    }

    #[tokio::test]
    async fn test_schema_violation_aborts_without_persisting() {
        let memory = Arc::new(MemoryStore::new());
        let store: Arc<dyn DocumentStore> = memory.clone();

        let mut draft = valid_draft();
        draft.category_scores[0].category = "Charisma".to_string();
        let generator: Arc<dyn FeedbackGenerator> = Arc::new(StubGenerator::new(draft));

        let result = create_feedback(&store, &generator, &params()).await;
        assert!(!result.success);
        assert!(result.feedback_id.is_none());
        assert!(result.error.unwrap().contains("Charisma"));
        assert_eq!(memory.feedback_count(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_is_recovered() {
        let memory = Arc::new(MemoryStore::new());
        let store: Arc<dyn DocumentStore> = memory.clone();
        let generator: Arc<dyn FeedbackGenerator> = Arc::new(FailingGenerator);

        let result = create_feedback(&store, &generator, &params()).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("model call failed"));
        assert_eq!(memory.feedback_count(), 0);
    }

    #[tokio::test]
    async fn test_reinvocation_appends_a_second_record() {
        let memory = Arc::new(MemoryStore::new());
        let store: Arc<dyn DocumentStore> = memory.clone();
        let generator: Arc<dyn FeedbackGenerator> = Arc::new(StubGenerator::new(valid_draft()));
        let params = params();

        let first = create_feedback(&store, &generator, &params).await;
        let second = create_feedback(&store, &generator, &params).await;
        assert!(first.success && second.success);
        assert_ne!(first.feedback_id, second.feedback_id);
        assert_eq!(memory.feedback_count(), 2);

        // Lookup returns one of them; which one is implementation-defined.
        let found = lookup(&store, params.interview_id, &params.user_id)
            .await
            .unwrap()
            .unwrap();
        assert!(
            [first.feedback_id.unwrap(), second.feedback_id.unwrap()].contains(&found.id)
        );
    }

    #[tokio::test]
    async fn test_lookup_bounds_after_single_persist() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let generator: Arc<dyn FeedbackGenerator> = Arc::new(StubGenerator::new(valid_draft()));
        let params = params();

        create_feedback(&store, &generator, &params).await;
        let stored = lookup(&store, params.interview_id, &params.user_id)
            .await
            .unwrap()
            .unwrap();
        assert!((0..=100).contains(&stored.total_score));
        assert_eq!(stored.category_scores.len(), 5);
        assert!(stored
            .category_scores
            .iter()
            .all(|c| (0..=100).contains(&c.score)));
    }
}
