use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Catalog entry. Price and duration are snapshotted onto jobs at booking
/// time, so later edits never rewrite booking history.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub duration_minutes: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    pub fn new(name: String, description: Option<String>, price: i64, duration_minutes: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            price,
            duration_minutes,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
