use crate::domain::models::{
    auth::RefreshTokenRecord,
    booking::Booking,
    job::Job,
    progress::ProgressEntry,
    service::Service,
    status::BookingStatus,
    user::User,
};
use crate::domain::services::scheduling::StaffCommitment;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    /// Staff directory lookup: active accounts holding the given role.
    async fn list_active_by_role(&self, role: &str) -> Result<Vec<User>, AppError>;
    async fn list(&self) -> Result<Vec<User>, AppError>;
}

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn create(&self, service: &Service) -> Result<Service, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Service>, AppError>;
    async fn list_active(&self) -> Result<Vec<Service>, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Atomic creation of a booking, its jobs, and their initial progress
    /// entries. Either everything lands or nothing does.
    async fn create_with_jobs(
        &self,
        booking: &Booking,
        jobs: &[Job],
        progress: &[ProgressEntry],
    ) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn find_by_code(&self, booking_code: &str) -> Result<Option<Booking>, AppError>;
    async fn list_by_user(&self, user_profile_id: &str) -> Result<Vec<Booking>, AppError>;
    /// Atomic booking update: field changes plus in-place job updates, fresh
    /// jobs, and the progress entries recording both, in one transaction.
    async fn update_with_jobs(
        &self,
        booking: &Booking,
        updated_jobs: &[Job],
        new_jobs: &[Job],
        progress: &[ProgressEntry],
    ) -> Result<(), AppError>;
    /// Optimistic status move: the row must still hold `expected` or the
    /// write is rejected as a conflict.
    async fn update_status(
        &self,
        id: &str,
        expected: BookingStatus,
        new_status: BookingStatus,
    ) -> Result<(), AppError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Job>, AppError>;
    async fn list_by_booking(&self, booking_id: &str) -> Result<Vec<Job>, AppError>;
    async fn list_by_assignee(&self, assignee_id: &str) -> Result<Vec<Job>, AppError>;
    /// Day commitment query: (staff, interval) pairs of all non-terminal jobs
    /// whose planned start falls on the given UTC calendar day.
    async fn find_day_commitments(&self, day: NaiveDate) -> Result<Vec<StaffCommitment>, AppError>;
    /// Atomic status transition: writes the job row guarded by its previous
    /// status and appends the progress entry in the same transaction.
    async fn transition(
        &self,
        job: &Job,
        expected: BookingStatus,
        progress: &ProgressEntry,
    ) -> Result<(), AppError>;
    async fn update_assignee(&self, job_id: &str, assignee_id: &str) -> Result<(), AppError>;
    async fn list_progress(&self, job_id: &str) -> Result<Vec<ProgressEntry>, AppError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AppError>;
    /// Highest generation issued so far within a rotation family. `None` when
    /// the family has no live tokens.
    async fn find_latest_generation(&self, family_id: Uuid) -> Result<Option<i32>, AppError>;
    async fn delete_refresh_token(&self, token_hash: &str) -> Result<(), AppError>;
    async fn delete_refresh_family(&self, family_id: Uuid) -> Result<(), AppError>;
}
