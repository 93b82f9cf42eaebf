use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::domain::ports::{
    AuthRepository, BookingRepository, JobRepository, ServiceRepository, UserRepository,
};
use crate::domain::services::auth_service::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub service_repo: Arc<dyn ServiceRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub job_repo: Arc<dyn JobRepository>,
    pub auth_repo: Arc<dyn AuthRepository>,
    pub auth_service: Arc<AuthService>,
    /// Serializes booking creation. Two concurrent creations would each read
    /// the day's commitments before either commits and could hand the same
    /// staff member overlapping intervals; the lock is held from that read
    /// through the commit.
    pub booking_create_lock: Arc<Mutex<()>>,
}
