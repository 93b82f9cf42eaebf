use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::models::status::BookingStatus;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct CreateMemberRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: String,
}

#[derive(Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub duration_minutes: i32,
}

#[derive(Deserialize)]
pub struct BookingItemRequest {
    pub service_id: String,
    pub vehicle_description: String,
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    // Guest contact, required when no customer is logged in.
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_email: Option<String>,

    pub booking_datetime: DateTime<Utc>,
    pub items: Vec<BookingItemRequest>,
    pub note: Option<String>,
}

/// One entry of the replacement job list on a booking update. An `id`
/// references an existing job to keep; items without an id become fresh jobs.
/// Existing jobs missing from the list are soft-cancelled.
#[derive(Deserialize)]
pub struct UpdateBookingItemRequest {
    pub id: Option<String>,
    pub service_id: String,
    pub vehicle_description: String,
    pub assignee_id: Option<String>,
    pub planned_start_time: Option<DateTime<Utc>>,
    pub planned_end_time: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct UpdateBookingRequest {
    pub booking_datetime: DateTime<Utc>,
    pub items: Vec<UpdateBookingItemRequest>,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub new_status: BookingStatus,
}

#[derive(Deserialize)]
pub struct UpdateJobStatusRequest {
    pub new_status: BookingStatus,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct AssignStaffRequest {
    pub new_assignee_id: String,
}

#[derive(Deserialize)]
pub struct CompleteServiceRequest {
    pub note: Option<String>,
}
