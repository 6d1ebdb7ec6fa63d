//! Postgres-backed document store. Schema lives in `migrations/`.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::models::feedback::{CategoryScore, Feedback, NewFeedback};
use crate::models::interview::Interview;
use crate::models::user::User;
use crate::store::{DocumentStore, StoreError};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a fresh pool and wraps it.
    pub async fn connect(database_url: &str) -> Result<Self> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        info!("PostgreSQL connection pool established");
        Ok(Self::new(pool))
    }
}

/// Row shape for feedback; category scores are stored as a jsonb column.
#[derive(Debug, FromRow)]
struct FeedbackRow {
    id: Uuid,
    interview_id: Uuid,
    user_id: String,
    total_score: i32,
    category_scores: Json<Vec<CategoryScore>>,
    strengths: Vec<String>,
    areas_for_improvement: Vec<String>,
    final_assessment: String,
    created_at: DateTime<Utc>,
}

impl From<FeedbackRow> for Feedback {
    fn from(row: FeedbackRow) -> Self {
        Feedback {
            id: row.id,
            interview_id: row.interview_id,
            user_id: row.user_id,
            total_score: row.total_score,
            category_scores: row.category_scores.0,
            strengths: row.strengths,
            areas_for_improvement: row.areas_for_improvement,
            final_assessment: row.final_assessment,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn get_user(&self, uid: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, user: &User) -> Result<bool, StoreError> {
        // Conditional write: the unique key, not a prior read, decides
        // whether the insert lands.
        let result = sqlx::query(
            "INSERT INTO users (id, name, email) VALUES ($1, $2, $3) ON CONFLICT (id) DO NOTHING",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn get_interview(&self, id: Uuid) -> Result<Option<Interview>, StoreError> {
        let interview =
            sqlx::query_as::<_, Interview>("SELECT * FROM interviews WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(interview)
    }

    async fn interviews_for_user(&self, user_id: &str) -> Result<Vec<Interview>, StoreError> {
        let interviews = sqlx::query_as::<_, Interview>(
            "SELECT * FROM interviews WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(interviews)
    }

    async fn latest_interviews(
        &self,
        exclude_user_id: &str,
        limit: i64,
    ) -> Result<Vec<Interview>, StoreError> {
        let interviews = sqlx::query_as::<_, Interview>(
            "SELECT * FROM interviews \
             WHERE finalized = TRUE AND user_id <> $1 \
             ORDER BY created_at DESC LIMIT $2",
        )
        .bind(exclude_user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(interviews)
    }

    async fn add_feedback(&self, feedback: &NewFeedback) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO feedback
                (id, interview_id, user_id, total_score, category_scores,
                 strengths, areas_for_improvement, final_assessment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(id)
        .bind(feedback.interview_id)
        .bind(&feedback.user_id)
        .bind(feedback.total_score)
        .bind(Json(&feedback.category_scores))
        .bind(&feedback.strengths)
        .bind(&feedback.areas_for_improvement)
        .bind(&feedback.final_assessment)
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn feedback_for_interview(
        &self,
        interview_id: Uuid,
        user_id: &str,
    ) -> Result<Option<Feedback>, StoreError> {
        let row = sqlx::query_as::<_, FeedbackRow>(
            "SELECT * FROM feedback WHERE interview_id = $1 AND user_id = $2 LIMIT 1",
        )
        .bind(interview_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Feedback::from))
    }
}
