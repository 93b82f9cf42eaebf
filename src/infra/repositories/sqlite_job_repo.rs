use crate::domain::{
    models::{job::Job, progress::ProgressEntry, status::BookingStatus},
    ports::JobRepository,
    services::scheduling::StaffCommitment,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use sqlx::SqlitePool;

pub struct SqliteJobRepo {
    pool: SqlitePool,
}

impl SqliteJobRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for SqliteJobRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<Job>, AppError> {
        sqlx::query_as::<_, Job>("SELECT * FROM booking_jobs WHERE id = ?")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_booking(&self, booking_id: &str) -> Result<Vec<Job>, AppError> {
        sqlx::query_as::<_, Job>("SELECT * FROM booking_jobs WHERE booking_id = ? ORDER BY created_at ASC")
            .bind(booking_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_assignee(&self, assignee_id: &str) -> Result<Vec<Job>, AppError> {
        sqlx::query_as::<_, Job>("SELECT * FROM booking_jobs WHERE assignee_id = ? ORDER BY planned_start_time ASC")
            .bind(assignee_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_day_commitments(&self, day: NaiveDate) -> Result<Vec<StaffCommitment>, AppError> {
        let day_start = day.and_hms_opt(0, 0, 0)
            .ok_or(AppError::Internal)?
            .and_utc();
        let day_end = day_start + Duration::days(1);

        sqlx::query_as::<_, StaffCommitment>(
            "SELECT assignee_id AS staff_id, planned_start_time AS start_time, planned_end_time AS end_time
             FROM booking_jobs
             WHERE assignee_id IS NOT NULL
               AND status IN ('Scheduled', 'ServiceInProgress')
               AND planned_start_time >= ? AND planned_start_time < ?"
        )
            .bind(day_start).bind(day_end)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn transition(
        &self,
        job: &Job,
        expected: BookingStatus,
        progress: &ProgressEntry,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let result = sqlx::query(
            "UPDATE booking_jobs SET status = ?, actual_start_time = ?, actual_end_time = ?, updated_at = ?
             WHERE id = ? AND status = ?"
        )
            .bind(job.status).bind(job.actual_start_time).bind(job.actual_end_time).bind(job.updated_at)
            .bind(&job.id).bind(expected)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Job status changed concurrently. Please retry.".into()));
        }

        sqlx::query(
            "INSERT INTO job_progress (id, job_id, status, note, created_by_user_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?)"
        )
            .bind(&progress.id).bind(&progress.job_id).bind(progress.status).bind(&progress.note)
            .bind(&progress.created_by_user_id).bind(progress.created_at)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn update_assignee(&self, job_id: &str, assignee_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE booking_jobs SET assignee_id = ?, updated_at = ? WHERE id = ?")
            .bind(assignee_id).bind(chrono::Utc::now()).bind(job_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Job not found".into()));
        }
        Ok(())
    }

    async fn list_progress(&self, job_id: &str) -> Result<Vec<ProgressEntry>, AppError> {
        sqlx::query_as::<_, ProgressEntry>("SELECT * FROM job_progress WHERE job_id = ? ORDER BY created_at ASC")
            .bind(job_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
