use serde::Serialize;

use crate::domain::models::{booking::Booking, job::Job, progress::ProgressEntry};

#[derive(Serialize)]
pub struct BookingCreatedResponse {
    pub booking_id: String,
    pub booking_code: String,
}

#[derive(Serialize)]
pub struct BookingWithJobsResponse {
    #[serde(flatten)]
    pub booking: Booking,
    pub jobs: Vec<Job>,
}

#[derive(Serialize)]
pub struct JobProgressResponse {
    pub job_id: String,
    pub steps: Vec<ProgressEntry>,
}
