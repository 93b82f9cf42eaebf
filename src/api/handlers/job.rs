use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::{AssignStaffRequest, CompleteServiceRequest, UpdateJobStatusRequest};
use crate::api::dtos::responses::JobProgressResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::job::Job;
use crate::domain::models::progress::ProgressEntry;
use crate::domain::models::status::{can_transition, BookingStatus};
use crate::domain::models::user::ROLE_STAFF;
use crate::domain::services::guards::{is_active_staff, is_admin, require_assignee_or_admin};
use crate::error::AppError;
use crate::state::AppState;

const STARTED_NOTE: &str = "Service has been started.";
const COMPLETED_NOTE: &str = "Service has been completed.";

async fn load_job(
    state: &AppState,
    booking_id: &str,
    job_id: &str,
) -> Result<Job, AppError> {
    state.job_repo.find_by_id(job_id).await?
        .filter(|j| j.booking_id == booking_id)
        .ok_or_else(|| AppError::NotFound("Booking detail not found.".into()))
}

/// Generic status move for non-privileged targets. `ServiceInProgress` and
/// `Completed` are reserved for the start/complete actions, which stamp the
/// actual times.
pub async fn update_job_status(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path((booking_id, job_id)): Path<(String, String)>,
    Json(payload): Json<UpdateJobStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let job = load_job(&state, &booking_id, &job_id).await?;

    if matches!(payload.new_status, BookingStatus::ServiceInProgress | BookingStatus::Completed) {
        return Err(AppError::InvalidAction(
            "Please use the specific 'Start Service' or 'Complete Service' action to change to this status.".into(),
        ));
    }

    let booking = state.booking_repo.find_by_id(&booking_id).await?
        .ok_or_else(|| AppError::NotFound("Booking not found.".into()))?;
    if booking.status == BookingStatus::Scheduled {
        return Err(AppError::BookingNotReady);
    }

    if !can_transition(job.status, payload.new_status) {
        return Err(AppError::InvalidTransition { from: job.status, to: payload.new_status });
    }

    require_assignee_or_admin(&actor, job.assignee_id.as_deref())?;

    let expected = job.status;
    let mut updated = job;
    updated.status = payload.new_status;
    updated.updated_at = Utc::now();

    let progress = ProgressEntry::new(
        updated.id.clone(),
        payload.new_status,
        payload.note,
        Some(actor.id.clone()),
    );
    state.job_repo.transition(&updated, expected, &progress).await?;

    info!(job_id = %updated.id, from = %expected, to = %payload.new_status, "Job status updated");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_staff(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path((booking_id, job_id)): Path<(String, String)>,
    Json(payload): Json<AssignStaffRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !is_admin(&actor) {
        return Err(AppError::Forbidden(
            "Permission denied. Only an Administrator can assign a staff to a service.".into(),
        ));
    }

    let job = load_job(&state, &booking_id, &job_id).await?;

    let target = state.user_repo.find_by_id(&payload.new_assignee_id).await?
        .filter(is_active_staff)
        .ok_or_else(|| AppError::NotFound("The selected staff member is invalid or not found.".into()))?;

    if matches!(
        job.status,
        BookingStatus::Completed
            | BookingStatus::Cancelled
            | BookingStatus::QualityCheck
            | BookingStatus::ReadyForPickup
    ) {
        return Err(AppError::Conflict(format!(
            "Cannot assign staff to a service in status '{}'.",
            job.status
        )));
    }

    state.job_repo.update_assignee(&job.id, &target.id).await?;

    info!(job_id = %job.id, assignee_id = %target.id, "Job reassigned");

    Ok(StatusCode::NO_CONTENT)
}

/// Start is restricted to the assigned staff member; admins may not start a
/// service on someone else's behalf.
pub async fn start_service(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path((booking_id, job_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let job = load_job(&state, &booking_id, &job_id).await?;

    let booking = state.booking_repo.find_by_id(&booking_id).await?
        .ok_or_else(|| AppError::NotFound("Booking not found.".into()))?;
    if booking.status.is_terminal() {
        return Err(AppError::Conflict("The booking has been cancelled or completed.".into()));
    }

    if !can_transition(job.status, BookingStatus::ServiceInProgress) {
        return Err(AppError::InvalidTransition {
            from: job.status,
            to: BookingStatus::ServiceInProgress,
        });
    }

    match job.assignee_id.as_deref() {
        None => return Err(AppError::Unassigned),
        Some(assignee) if assignee != actor.id => {
            return Err(AppError::Forbidden(
                "Permission denied. Only the assigned staff can start the service.".into(),
            ));
        }
        Some(_) => {}
    }

    let expected = job.status;
    let mut updated = job;
    updated.status = BookingStatus::ServiceInProgress;
    updated.actual_start_time = Some(Utc::now());
    updated.updated_at = Utc::now();

    let progress = ProgressEntry::new(
        updated.id.clone(),
        BookingStatus::ServiceInProgress,
        Some(STARTED_NOTE.to_string()),
        Some(actor.id.clone()),
    );
    state.job_repo.transition(&updated, expected, &progress).await?;

    info!(job_id = %updated.id, "Service started");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn complete_service(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path((booking_id, job_id)): Path<(String, String)>,
    Json(payload): Json<CompleteServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let job = load_job(&state, &booking_id, &job_id).await?;

    require_assignee_or_admin(&actor, job.assignee_id.as_deref())?;

    if !can_transition(job.status, BookingStatus::Completed) {
        return Err(AppError::InvalidTransition {
            from: job.status,
            to: BookingStatus::Completed,
        });
    }

    let expected = job.status;
    let mut updated = job;
    updated.status = BookingStatus::Completed;
    updated.actual_end_time = Some(Utc::now());
    updated.updated_at = Utc::now();

    let progress = ProgressEntry::new(
        updated.id.clone(),
        BookingStatus::Completed,
        Some(payload.note.unwrap_or_else(|| COMPLETED_NOTE.to_string())),
        Some(actor.id.clone()),
    );
    state.job_repo.transition(&updated, expected, &progress).await?;

    info!(job_id = %updated.id, "Service completed");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn my_tasks(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let jobs = state.job_repo.list_by_assignee(&actor.id).await?;
    Ok(Json(jobs))
}

pub async fn job_progress(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Path((booking_id, job_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_repo.find_by_id(&booking_id).await?
        .ok_or_else(|| AppError::NotFound("Booking not found.".into()))?;

    let is_owner = booking.user_profile_id.as_deref() == Some(actor.id.as_str());
    if !is_admin(&actor) && actor.role != ROLE_STAFF && !is_owner {
        return Err(AppError::Forbidden("Permission denied.".into()));
    }

    let job = load_job(&state, &booking_id, &job_id).await?;
    let steps = state.job_repo.list_progress(&job.id).await?;
    Ok(Json(JobProgressResponse { job_id: job.id, steps }))
}
