use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::models::status::BookingStatus;
use crate::domain::services::booking_code;

pub const PAYMENT_UNPAID: &str = "Unpaid";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub booking_code: String,
    pub user_profile_id: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub booking_datetime: DateTime<Utc>,
    pub total_amount: i64,
    pub status: BookingStatus,
    pub payment_status: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub user_profile_id: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub booking_datetime: DateTime<Utc>,
    pub total_amount: i64,
    pub note: Option<String>,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let id = Uuid::new_v4();
        let now = Utc::now();
        Self {
            id: id.to_string(),
            booking_code: booking_code::generate(id, params.booking_datetime),
            user_profile_id: params.user_profile_id,
            customer_name: params.customer_name,
            customer_phone: params.customer_phone,
            customer_email: params.customer_email,
            booking_datetime: params.booking_datetime,
            total_amount: params.total_amount,
            status: BookingStatus::Scheduled,
            payment_status: PAYMENT_UNPAID.to_string(),
            note: params.note,
            created_at: now,
            updated_at: now,
        }
    }
}
