use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::models::status::BookingStatus;

/// Append-only audit record of a job status change. A missing
/// `created_by_user_id` marks a system-generated entry.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ProgressEntry {
    pub id: String,
    pub job_id: String,
    pub status: BookingStatus,
    pub note: Option<String>,
    pub created_by_user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProgressEntry {
    pub fn new(
        job_id: String,
        status: BookingStatus,
        note: Option<String>,
        created_by_user_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            job_id,
            status,
            note,
            created_by_user_id,
            created_at: Utc::now(),
        }
    }
}
