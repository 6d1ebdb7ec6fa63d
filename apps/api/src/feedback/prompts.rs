// Feedback scoring prompt templates.
// All prompts for the feedback module are defined here.

pub const FEEDBACK_SYSTEM: &str = "\
You are a professional interviewer analyzing a mock interview. \
Your task is to evaluate the candidate based on structured categories and \
provide comprehensive feedback. \
You MUST respond with valid JSON only — no markdown fences, no explanations.";

pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"You are an AI interviewer analyzing a mock interview. Your task is to evaluate the candidate based on structured categories. Be thorough and detailed in your analysis. Don't be lenient with the candidate. If there are mistakes or areas for improvement, point them out.

Transcript:
{transcript}

Please provide a comprehensive feedback analysis with the following structure:

1. "totalScore": a number from 0-100 representing the overall performance
2. "categoryScores": an array of objects, each containing:
   - "category": the category name (exactly as listed below)
   - "score": a number from 0-100 for that category
   - "feedback": detailed feedback for that category

Categories to evaluate (use these exact names, in this order):
- "Communication Skills": clarity, articulation, structured responses
- "Technical Knowledge": understanding of key concepts for the role
- "Problem-Solving": ability to analyze problems and propose solutions
- "Cultural & Role Fit": alignment with company values and job role
- "Confidence & Clarity": confidence in responses, engagement, and clarity

3. "strengths": an array of strings highlighting the candidate's strengths
4. "areasForImprovement": an array of strings identifying areas that need improvement
5. "finalAssessment": a comprehensive summary paragraph of the overall performance

Return ONLY the JSON object — nothing else, no code fences."#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::schema::FEEDBACK_CATEGORIES;

    #[test]
    fn test_template_has_transcript_placeholder() {
        assert!(FEEDBACK_PROMPT_TEMPLATE.contains("{transcript}"));
    }

    #[test]
    fn test_template_names_all_categories() {
        for category in FEEDBACK_CATEGORIES {
            assert!(
                FEEDBACK_PROMPT_TEMPLATE.contains(category),
                "prompt missing category '{category}'"
            );
        }
    }
}
