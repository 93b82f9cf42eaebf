use crate::domain::{
    models::{booking::Booking, job::Job, progress::ProgressEntry, status::BookingStatus},
    ports::BookingRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert_job(tx: &mut Transaction<'_, Postgres>, job: &Job) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO booking_jobs (id, booking_id, service_id, vehicle_description, assignee_id, status, price, duration_minutes, planned_start_time, planned_end_time, actual_start_time, actual_end_time, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"
    )
        .bind(&job.id).bind(&job.booking_id).bind(&job.service_id).bind(&job.vehicle_description)
        .bind(&job.assignee_id).bind(job.status).bind(job.price).bind(job.duration_minutes)
        .bind(job.planned_start_time).bind(job.planned_end_time).bind(job.actual_start_time)
        .bind(job.actual_end_time).bind(job.created_at).bind(job.updated_at)
        .execute(&mut **tx).await.map_err(AppError::Database)?;
    Ok(())
}

async fn insert_progress(tx: &mut Transaction<'_, Postgres>, entry: &ProgressEntry) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO job_progress (id, job_id, status, note, created_by_user_id, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)"
    )
        .bind(&entry.id).bind(&entry.job_id).bind(entry.status).bind(&entry.note)
        .bind(&entry.created_by_user_id).bind(entry.created_at)
        .execute(&mut **tx).await.map_err(AppError::Database)?;
    Ok(())
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create_with_jobs(
        &self,
        booking: &Booking,
        jobs: &[Job],
        progress: &[ProgressEntry],
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, booking_code, user_profile_id, customer_name, customer_phone, customer_email, booking_datetime, total_amount, status, payment_status, note, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.booking_code).bind(&booking.user_profile_id)
            .bind(&booking.customer_name).bind(&booking.customer_phone).bind(&booking.customer_email)
            .bind(booking.booking_datetime).bind(booking.total_amount).bind(booking.status)
            .bind(&booking.payment_status).bind(&booking.note).bind(booking.created_at).bind(booking.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        for job in jobs {
            insert_job(&mut tx, job).await?;
        }
        for entry in progress {
            insert_progress(&mut tx, entry).await?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_code(&self, booking_code: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE booking_code = $1")
            .bind(booking_code).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_user(&self, user_profile_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE user_profile_id = $1 ORDER BY booking_datetime DESC")
            .bind(user_profile_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_with_jobs(
        &self,
        booking: &Booking,
        updated_jobs: &[Job],
        new_jobs: &[Job],
        progress: &[ProgressEntry],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("UPDATE bookings SET booking_datetime = $1, note = $2, updated_at = $3 WHERE id = $4")
            .bind(booking.booking_datetime).bind(&booking.note).bind(booking.updated_at).bind(&booking.id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        for job in updated_jobs {
            sqlx::query(
                "UPDATE booking_jobs SET service_id = $1, vehicle_description = $2, assignee_id = $3, status = $4, price = $5, duration_minutes = $6, planned_start_time = $7, planned_end_time = $8, updated_at = $9
                 WHERE id = $10 AND booking_id = $11"
            )
                .bind(&job.service_id).bind(&job.vehicle_description).bind(&job.assignee_id)
                .bind(job.status).bind(job.price).bind(job.duration_minutes)
                .bind(job.planned_start_time).bind(job.planned_end_time).bind(job.updated_at)
                .bind(&job.id).bind(&booking.id)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        for job in new_jobs {
            insert_job(&mut tx, job).await?;
        }
        for entry in progress {
            insert_progress(&mut tx, entry).await?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn update_status(
        &self,
        id: &str,
        expected: BookingStatus,
        new_status: BookingStatus,
    ) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE bookings SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4")
            .bind(new_status).bind(Utc::now()).bind(id).bind(expected)
            .execute(&self.pool).await.map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Booking status changed concurrently. Please retry.".into()));
        }
        Ok(())
    }
}
