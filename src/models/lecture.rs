use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `order` is instructor-supplied and not kept unique or contiguous.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Lecture {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub video_url: String,
    pub duration: i64,
    pub order: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateLectureRequest {
    pub title: String,
    pub video_url: String,
    #[serde(default)]
    pub duration: i64,
    pub order: i64,
}
