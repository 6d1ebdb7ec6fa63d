//! In-process document store for local development and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::models::feedback::{Feedback, NewFeedback};
use crate::models::interview::Interview;
use crate::models::user::User;
use crate::store::{DocumentStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    interviews: RwLock<HashMap<Uuid, Interview>>,
    /// Insertion-ordered, append-only, duplicates allowed — matching the
    /// feedback collection's semantics.
    feedback: RwLock<Vec<Feedback>>,
}

#[allow(dead_code)] // seeding helpers are exercised by tests only
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an interview record; interviews are externally populated in
    /// production, so the memory backend takes them directly.
    pub fn insert_interview(&self, interview: Interview) {
        self.interviews
            .write()
            .unwrap()
            .insert(interview.id, interview);
    }

    pub fn feedback_count(&self) -> usize {
        self.feedback.read().unwrap().len()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_user(&self, uid: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().unwrap().get(uid).cloned())
    }

    async fn create_user(&self, user: &User) -> Result<bool, StoreError> {
        let mut users = self.users.write().unwrap();
        if users.contains_key(&user.id) {
            return Ok(false);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(true)
    }

    async fn get_interview(&self, id: Uuid) -> Result<Option<Interview>, StoreError> {
        Ok(self.interviews.read().unwrap().get(&id).cloned())
    }

    async fn interviews_for_user(&self, user_id: &str) -> Result<Vec<Interview>, StoreError> {
        let mut interviews: Vec<Interview> = self
            .interviews
            .read()
            .unwrap()
            .values()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        interviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(interviews)
    }

    async fn latest_interviews(
        &self,
        exclude_user_id: &str,
        limit: i64,
    ) -> Result<Vec<Interview>, StoreError> {
        let mut interviews: Vec<Interview> = self
            .interviews
            .read()
            .unwrap()
            .values()
            .filter(|i| i.finalized && i.user_id != exclude_user_id)
            .cloned()
            .collect();
        interviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        interviews.truncate(limit.max(0) as usize);
        Ok(interviews)
    }

    async fn add_feedback(&self, feedback: &NewFeedback) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        self.feedback.write().unwrap().push(Feedback {
            id,
            interview_id: feedback.interview_id,
            user_id: feedback.user_id.clone(),
            total_score: feedback.total_score,
            category_scores: feedback.category_scores.clone(),
            strengths: feedback.strengths.clone(),
            areas_for_improvement: feedback.areas_for_improvement.clone(),
            final_assessment: feedback.final_assessment.clone(),
            created_at: feedback.created_at,
        });
        Ok(id)
    }

    async fn feedback_for_interview(
        &self,
        interview_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Feedback>, StoreError> {
        Ok(self
            .feedback
            .read()
            .unwrap()
            .iter()
            .find(|f| f.interview_id == interview_id && f.user_id == user_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn make_interview(user_id: &str, finalized: bool, age_hours: i64) -> Interview {
        Interview {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            role: "Backend Engineer".to_string(),
            level: "mid".to_string(),
            interview_type: "technical".to_string(),
            techstack: vec!["rust".to_string()],
            questions: vec!["Tell me about ownership.".to_string()],
            finalized,
            created_at: Utc::now() - Duration::hours(age_hours),
        }
    }

    #[tokio::test]
    async fn test_create_user_is_conditional() {
        let store = MemoryStore::new();
        let user = User {
            id: "u1".to_string(),
            name: "A".to_string(),
            email: "a@x.com".to_string(),
        };

        assert!(store.create_user(&user).await.unwrap());

        // Second insert with different data must not land.
        let imposter = User {
            id: "u1".to_string(),
            name: "B".to_string(),
            email: "b@x.com".to_string(),
        };
        assert!(!store.create_user(&imposter).await.unwrap());

        let stored = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(stored.name, "A");
        assert_eq!(stored.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_latest_interviews_excludes_owner_and_unfinalized() {
        let store = MemoryStore::new();
        store.insert_interview(make_interview("u1", true, 1));
        store.insert_interview(make_interview("u2", true, 2));
        store.insert_interview(make_interview("u2", false, 3));
        store.insert_interview(make_interview("u3", true, 4));

        let latest = store.latest_interviews("u2", 10).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert!(latest.iter().all(|i| i.user_id != "u2" && i.finalized));
        // Newest first.
        assert!(latest[0].created_at > latest[1].created_at);
    }

    #[tokio::test]
    async fn test_latest_interviews_respects_limit() {
        let store = MemoryStore::new();
        for hours in 0..5 {
            store.insert_interview(make_interview("other", true, hours));
        }
        let latest = store.latest_interviews("me", 3).await.unwrap();
        assert_eq!(latest.len(), 3);
    }

    #[tokio::test]
    async fn test_interviews_for_user_newest_first() {
        let store = MemoryStore::new();
        store.insert_interview(make_interview("u1", true, 5));
        store.insert_interview(make_interview("u1", false, 1));
        store.insert_interview(make_interview("u2", true, 2));

        let mine = store.interviews_for_user("u1").await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine[0].created_at > mine[1].created_at);
    }
}
