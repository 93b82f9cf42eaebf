use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::models::status::BookingStatus;

/// One service performed on one vehicle within a booking. Price and duration
/// are copied from the service at creation time.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Job {
    pub id: String,
    pub booking_id: String,
    pub service_id: String,
    pub vehicle_description: String,
    pub assignee_id: Option<String>,
    pub status: BookingStatus,
    pub price: i64,
    pub duration_minutes: i32,
    pub planned_start_time: DateTime<Utc>,
    pub planned_end_time: DateTime<Utc>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewJobParams {
    pub booking_id: String,
    pub service_id: String,
    pub vehicle_description: String,
    pub assignee_id: Option<String>,
    pub price: i64,
    pub duration_minutes: i32,
    pub planned_start_time: DateTime<Utc>,
    pub planned_end_time: DateTime<Utc>,
}

impl Job {
    pub fn new(params: NewJobParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id: params.booking_id,
            service_id: params.service_id,
            vehicle_description: params.vehicle_description,
            assignee_id: params.assignee_id,
            status: BookingStatus::Scheduled,
            price: params.price,
            duration_minutes: params.duration_minutes,
            planned_start_time: params.planned_start_time,
            planned_end_time: params.planned_end_time,
            actual_start_time: None,
            actual_end_time: None,
            created_at: now,
            updated_at: now,
        }
    }
}
