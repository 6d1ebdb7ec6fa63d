//! Model output schema for feedback generation, and its validation.
//!
//! The draft uses the model-facing field names (`category`, `feedback`);
//! the storage schema renames them to `name`/`comment` at persist time.

use serde::{Deserialize, Serialize};

/// The five fixed evaluation categories, in prompt order. A draft must
/// contain exactly these names, once each.
pub const FEEDBACK_CATEGORIES: [&str; 5] = [
    "Communication Skills",
    "Technical Knowledge",
    "Problem-Solving",
    "Cultural & Role Fit",
    "Confidence & Clarity",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftCategoryScore {
    pub category: String,
    pub score: i32,
    pub feedback: String,
}

/// Structured output of the scoring call, exactly as the model returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackDraft {
    pub total_score: i32,
    pub category_scores: Vec<DraftCategoryScore>,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub final_assessment: String,
}

/// Strict schema check. A draft that fails here aborts the pipeline; nothing
/// is persisted.
pub fn validate_draft(draft: &FeedbackDraft) -> Result<(), String> {
    if !(0..=100).contains(&draft.total_score) {
        return Err(format!(
            "totalScore {} out of range [0,100]",
            draft.total_score
        ));
    }

    if draft.category_scores.len() != FEEDBACK_CATEGORIES.len() {
        return Err(format!(
            "expected {} category scores, got {}",
            FEEDBACK_CATEGORIES.len(),
            draft.category_scores.len()
        ));
    }

    let mut seen: Vec<&str> = Vec::with_capacity(FEEDBACK_CATEGORIES.len());
    for entry in &draft.category_scores {
        if !FEEDBACK_CATEGORIES.contains(&entry.category.as_str()) {
            return Err(format!("unrecognized category '{}'", entry.category));
        }
        if seen.contains(&entry.category.as_str()) {
            return Err(format!("duplicate category '{}'", entry.category));
        }
        if !(0..=100).contains(&entry.score) {
            return Err(format!(
                "score {} for '{}' out of range [0,100]",
                entry.score, entry.category
            ));
        }
        seen.push(&entry.category);
    }

    Ok(())
}
