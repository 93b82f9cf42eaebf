use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Duration;
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::{CreateBookingRequest, UpdateBookingRequest, UpdateBookingStatusRequest};
use crate::api::dtos::responses::{BookingCreatedResponse, BookingWithJobsResponse};
use crate::api::extractors::auth::AuthUser;
use crate::api::extractors::maybe_auth::MaybeAuthUser;
use crate::domain::models::booking::{Booking, NewBookingParams};
use crate::domain::models::job::{Job, NewJobParams};
use crate::domain::models::progress::ProgressEntry;
use crate::domain::models::status::{can_transition, BookingStatus};
use crate::domain::models::user::ROLE_STAFF;
use crate::domain::services::guards::is_admin;
use crate::domain::services::scheduling::{schedule_jobs, PlannedJob};
use crate::error::AppError;
use crate::state::AppState;

const CREATED_NOTE: &str = "Appointment has been automatically created by the system.";
const DETAIL_CREATED_NOTE: &str = "Booking detail has been automatically created by the system.";
const DETAIL_CANCELLED_NOTE: &str = "Booking detail has been automatically cancelled by the system.";

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(actor): MaybeAuthUser,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.items.is_empty() {
        return Err(AppError::Validation("At least one service item is required.".into()));
    }
    if payload.items.iter().any(|i| i.vehicle_description.trim().is_empty()) {
        return Err(AppError::Validation("Vehicle description is required for every item.".into()));
    }

    // Contact details come from the customer profile when logged in, or from
    // the guest fields otherwise.
    let (user_profile_id, customer_name, customer_phone, customer_email) = match &actor {
        Some(user) => {
            let profile = state.user_repo.find_by_id(&user.id).await?
                .ok_or(AppError::Unauthorized)?;
            (Some(profile.id), profile.full_name, profile.phone, profile.email)
        }
        None => {
            let name = payload.guest_name.clone().unwrap_or_default();
            let phone = payload.guest_phone.clone().unwrap_or_default();
            let email = payload.guest_email.clone().unwrap_or_default();
            if name.trim().is_empty() || phone.trim().is_empty() || email.trim().is_empty() {
                return Err(AppError::Validation(
                    "Guest name, phone number, and email are required.".into(),
                ));
            }
            (None, name, phone, email)
        }
    };

    let mut planned = Vec::with_capacity(payload.items.len());
    for item in &payload.items {
        let service = state.service_repo.find_by_id(&item.service_id).await?
            .filter(|s| s.is_active)
            .ok_or_else(|| AppError::ServiceInvalid("One or more services are invalid.".into()))?;

        planned.push(PlannedJob {
            duration_with_buffer: service.duration_minutes as i64 + state.config.buffer_minutes,
            vehicle_description: item.vehicle_description.clone(),
            service,
        });
    }

    let total_amount: i64 = planned.iter().map(|p| p.service.price).sum();

    // Commitment read and job insert must not interleave with another
    // creation, or both could claim the same staff interval.
    let _guard = state.booking_create_lock.lock().await;

    let staff = state.user_repo.list_active_by_role(ROLE_STAFF).await?;
    let commitments = state.job_repo
        .find_day_commitments(payload.booking_datetime.date_naive())
        .await?;

    let scheduled = schedule_jobs(payload.booking_datetime, planned, &staff, &commitments)
        .map_err(|e| AppError::SchedulingFailed(e.to_string()))?;

    let booking = Booking::new(NewBookingParams {
        user_profile_id,
        customer_name,
        customer_phone,
        customer_email,
        booking_datetime: payload.booking_datetime,
        total_amount,
        note: payload.note,
    });

    let mut jobs = Vec::with_capacity(scheduled.len());
    let mut progress = Vec::with_capacity(scheduled.len());
    for s in scheduled {
        let job = Job::new(NewJobParams {
            booking_id: booking.id.clone(),
            service_id: s.service.id,
            vehicle_description: s.vehicle_description,
            assignee_id: Some(s.assignee_id),
            price: s.service.price,
            duration_minutes: s.service.duration_minutes,
            planned_start_time: s.start_time,
            planned_end_time: s.end_time,
        });
        progress.push(ProgressEntry::new(
            job.id.clone(),
            BookingStatus::Scheduled,
            Some(CREATED_NOTE.to_string()),
            None,
        ));
        jobs.push(job);
    }

    let created = state.booking_repo.create_with_jobs(&booking, &jobs, &progress).await?;

    info!(booking_id = %created.id, booking_code = %created.booking_code, "Booking created");

    Ok((
        StatusCode::CREATED,
        Json(BookingCreatedResponse {
            booking_id: created.id,
            booking_code: created.booking_code,
        }),
    ))
}

pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !is_admin(&actor) {
        return Err(AppError::Forbidden("Permission denied.".into()));
    }

    let mut booking = state.booking_repo.find_by_id(&id).await?
        .ok_or_else(|| AppError::NotFound("Booking not found.".into()))?;

    if booking.status == BookingStatus::Completed {
        return Err(AppError::Conflict("Booking is completed. You can't update it.".into()));
    }

    let existing_jobs = state.job_repo.list_by_booking(&booking.id).await?;

    booking.booking_datetime = payload.booking_datetime;
    booking.note = payload.note;
    booking.updated_at = chrono::Utc::now();

    let mut updated_jobs = Vec::new();
    let mut new_jobs = Vec::new();
    let mut progress = Vec::new();

    for item in &payload.items {
        match &item.id {
            Some(job_id) => {
                let mut job = existing_jobs.iter()
                    .find(|j| &j.id == job_id)
                    .cloned()
                    .ok_or_else(|| AppError::NotFound("Booking detail not found.".into()))?;

                job.service_id = item.service_id.clone();
                job.vehicle_description = item.vehicle_description.clone();
                job.assignee_id = item.assignee_id.clone();
                if let Some(start) = item.planned_start_time {
                    job.planned_start_time = start;
                }
                if let Some(end) = item.planned_end_time {
                    job.planned_end_time = end;
                }
                job.updated_at = chrono::Utc::now();
                updated_jobs.push(job);
            }
            None => {
                let service = state.service_repo.find_by_id(&item.service_id).await?
                    .filter(|s| s.is_active)
                    .ok_or_else(|| {
                        AppError::ServiceInvalid("One or more services are invalid.".into())
                    })?;

                let start = item.planned_start_time.unwrap_or(booking.booking_datetime);
                let end = item.planned_end_time
                    .unwrap_or(start + Duration::minutes(service.duration_minutes as i64));

                let job = Job::new(NewJobParams {
                    booking_id: booking.id.clone(),
                    service_id: service.id.clone(),
                    vehicle_description: item.vehicle_description.clone(),
                    assignee_id: item.assignee_id.clone(),
                    price: service.price,
                    duration_minutes: service.duration_minutes,
                    planned_start_time: start,
                    planned_end_time: end,
                });
                progress.push(ProgressEntry::new(
                    job.id.clone(),
                    BookingStatus::Scheduled,
                    Some(DETAIL_CREATED_NOTE.to_string()),
                    None,
                ));
                new_jobs.push(job);
            }
        }
    }

    // Existing jobs left out of the request are soft-cancelled.
    let kept: Vec<&String> = payload.items.iter().filter_map(|i| i.id.as_ref()).collect();
    for job in &existing_jobs {
        if kept.iter().any(|id| *id == &job.id) || job.status == BookingStatus::Cancelled {
            continue;
        }
        let mut cancelled = job.clone();
        cancelled.status = BookingStatus::Cancelled;
        cancelled.updated_at = chrono::Utc::now();
        progress.push(ProgressEntry::new(
            cancelled.id.clone(),
            BookingStatus::Cancelled,
            Some(DETAIL_CANCELLED_NOTE.to_string()),
            None,
        ));
        updated_jobs.push(cancelled);
    }

    state.booking_repo
        .update_with_jobs(&booking, &updated_jobs, &new_jobs, &progress)
        .await?;

    info!(booking_id = %booking.id, "Booking updated");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateBookingStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    if actor.role != ROLE_STAFF && !is_admin(&actor) {
        return Err(AppError::Forbidden("Permission denied.".into()));
    }

    let booking = state.booking_repo.find_by_id(&id).await?
        .ok_or_else(|| AppError::NotFound("Booking not found.".into()))?;

    if !can_transition(booking.status, payload.new_status) {
        return Err(AppError::InvalidTransition {
            from: booking.status,
            to: payload.new_status,
        });
    }

    state.booking_repo
        .update_status(&booking.id, booking.status, payload.new_status)
        .await?;

    info!(booking_id = %booking.id, from = %booking.status, to = %payload.new_status, "Booking status updated");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !is_admin(&actor) {
        return Err(AppError::Forbidden("Permission denied.".into()));
    }

    let booking = state.booking_repo.find_by_id(&id).await?
        .ok_or_else(|| AppError::NotFound("Booking not found.".into()))?;

    state.booking_repo
        .update_status(&booking.id, booking.status, BookingStatus::Cancelled)
        .await?;

    info!(booking_id = %booking.id, "Booking cancelled");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_id(&id).await?
        .ok_or_else(|| AppError::NotFound("Booking not found.".into()))?;

    let is_owner = booking.user_profile_id.as_deref() == Some(actor.id.as_str());
    if !is_admin(&actor) && actor.role != ROLE_STAFF && !is_owner {
        return Err(AppError::Forbidden("Permission denied.".into()));
    }

    let jobs = state.job_repo.list_by_booking(&booking.id).await?;
    Ok(Json(BookingWithJobsResponse { booking, jobs }))
}

/// Public tracking by booking code, no authentication.
pub async fn track_booking(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_code(&code).await?
        .ok_or_else(|| AppError::NotFound("Booking not found.".into()))?;

    let jobs = state.job_repo.list_by_booking(&booking.id).await?;
    Ok(Json(BookingWithJobsResponse { booking, jobs }))
}

pub async fn my_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list_by_user(&actor.id).await?;
    Ok(Json(bookings))
}
