use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::models::service::Service;
use crate::domain::models::user::User;

/// A requested service plus the transition buffer, before any staff or time
/// has been assigned.
#[derive(Debug, Clone)]
pub struct PlannedJob {
    pub service: Service,
    pub vehicle_description: String,
    pub duration_with_buffer: i64,
}

/// A planned job pinned to a staff member and a concrete interval.
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    pub service: Service,
    pub vehicle_description: String,
    pub assignee_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// A (staff, interval) pair already committed earlier that day.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StaffCommitment {
    pub staff_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("No staff available to serve.")]
    NoStaffAvailable,
    #[error("Unable to find a suitable schedule. The time slot is full.")]
    SlotFull,
}

/// Greedy assignment of jobs to staff for a single requested start time.
///
/// Every job starts at `requested_start`; jobs are placed longest first, and
/// each goes to the least-loaded staff member whose timeline has no interval
/// overlapping the job's `[start, end)`. Ties go to the first staff member in
/// input order. All-or-nothing: the first unplaceable job fails the whole
/// request and nothing is kept.
///
/// The working timelines live only inside this call; concurrent invocations
/// must be serialized by the caller (see `AppState::booking_create_lock`).
pub fn schedule_jobs(
    requested_start: DateTime<Utc>,
    jobs: Vec<PlannedJob>,
    staff: &[User],
    existing: &[StaffCommitment],
) -> Result<Vec<ScheduledJob>, ScheduleError> {
    if staff.is_empty() {
        return Err(ScheduleError::NoStaffAvailable);
    }

    let mut timelines: HashMap<&str, Vec<(DateTime<Utc>, DateTime<Utc>)>> =
        staff.iter().map(|s| (s.id.as_str(), Vec::new())).collect();

    for commitment in existing {
        // Commitments of staff outside the active roster are ignored.
        if let Some(timeline) = timelines.get_mut(commitment.staff_id.as_str()) {
            timeline.push((commitment.start_time, commitment.end_time));
        }
    }

    let mut ordered = jobs;
    ordered.sort_by(|a, b| b.duration_with_buffer.cmp(&a.duration_with_buffer));

    let mut scheduled = Vec::with_capacity(ordered.len());

    for job in ordered {
        let start = requested_start;
        let end = start + Duration::minutes(job.duration_with_buffer);

        let mut best: Option<&User> = None;
        let mut min_workload = i64::MAX;

        for member in staff {
            let Some(timeline) = timelines.get(member.id.as_str()) else {
                continue;
            };
            let overlaps = timeline.iter().any(|&(s, e)| start < e && end > s);
            if overlaps {
                continue;
            }
            let workload: i64 = timeline.iter().map(|&(s, e)| (e - s).num_minutes()).sum();
            if workload < min_workload {
                min_workload = workload;
                best = Some(member);
            }
        }

        let Some(best) = best else {
            return Err(ScheduleError::SlotFull);
        };

        if let Some(timeline) = timelines.get_mut(best.id.as_str()) {
            timeline.push((start, end));
        }

        scheduled.push(ScheduledJob {
            service: job.service,
            vehicle_description: job.vehicle_description,
            assignee_id: best.id.clone(),
            start_time: start,
            end_time: end,
        });
    }

    Ok(scheduled)
}
