//! Document store seam covering the three collections this service touches:
//! users, interviews, and feedback.
//!
//! The store is treated as fully consistent and authoritative; nothing is
//! cached in-process. Carried in `AppState` as `Arc<dyn DocumentStore>`;
//! swapped at startup via the `STORE_BACKEND` env var.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

use crate::models::feedback::{Feedback, NewFeedback};
use crate::models::interview::Interview;
use crate::models::user::User;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_user(&self, uid: &str) -> Result<Option<User>, StoreError>;

    /// Conditional create: writes the user only if the uid is free.
    /// Returns `false` without mutation when the uid is already taken, so
    /// concurrent sign-ups for the same uid cannot race a check-then-write.
    async fn create_user(&self, user: &User) -> Result<bool, StoreError>;

    async fn get_interview(&self, id: Uuid) -> Result<Option<Interview>, StoreError>;

    /// The user's own interviews, newest first.
    async fn interviews_for_user(&self, user_id: &str) -> Result<Vec<Interview>, StoreError>;

    /// Finalized interviews created by other users, newest first.
    async fn latest_interviews(
        &self,
        exclude_user_id: &str,
        limit: i64,
    ) -> Result<Vec<Interview>, StoreError>;

    /// Appends a feedback record and returns its id. Always creates a new
    /// record — never upserts. Callers that need at-most-one feedback per
    /// (interview, user) pair must check existence first.
    async fn add_feedback(&self, feedback: &NewFeedback) -> Result<Uuid, StoreError>;

    /// Feedback for the (interview, user) pair. If duplicates exist the
    /// first match is returned; callers must not rely on which one.
    async fn feedback_for_interview(
        &self,
        interview_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Feedback>, StoreError>;
}
