use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{PgPool, SqlitePool};
use tokio::sync::Mutex;
use tracing::info;
use argon2::{password_hash::{SaltString, PasswordHasher}, Argon2};
use rand::rngs::OsRng;

use crate::config::Config;
use crate::domain::models::user::{NewUserParams, User, ROLE_ADMIN};
use crate::domain::ports::UserRepository;
use crate::domain::services::auth_service::AuthService;
use crate::state::AppState;
use crate::infra::repositories::{
    postgres_auth_repo::PostgresAuthRepo, postgres_booking_repo::PostgresBookingRepo,
    postgres_job_repo::PostgresJobRepo, postgres_service_repo::PostgresServiceRepo,
    postgres_user_repo::PostgresUserRepo,
    sqlite_auth_repo::SqliteAuthRepo, sqlite_booking_repo::SqliteBookingRepo,
    sqlite_job_repo::SqliteJobRepo, sqlite_service_repo::SqliteServiceRepo,
    sqlite_user_repo::SqliteUserRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let auth_repo = Arc::new(PostgresAuthRepo::new(pool.clone()));
        let auth_service = Arc::new(AuthService::new(auth_repo.clone(), config.clone()));
        let user_repo: Arc<dyn UserRepository> = Arc::new(PostgresUserRepo::new(pool.clone()));

        ensure_admin_account(user_repo.as_ref(), config).await;

        AppState {
            config: config.clone(),
            user_repo,
            service_repo: Arc::new(PostgresServiceRepo::new(pool.clone())),
            booking_repo: Arc::new(PostgresBookingRepo::new(pool.clone())),
            job_repo: Arc::new(PostgresJobRepo::new(pool.clone())),
            auth_repo,
            auth_service,
            booking_create_lock: Arc::new(Mutex::new(())),
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        let auth_repo = Arc::new(SqliteAuthRepo::new(pool.clone()));
        let auth_service = Arc::new(AuthService::new(auth_repo.clone(), config.clone()));
        let user_repo: Arc<dyn UserRepository> = Arc::new(SqliteUserRepo::new(pool.clone()));

        ensure_admin_account(user_repo.as_ref(), config).await;

        AppState {
            config: config.clone(),
            user_repo,
            service_repo: Arc::new(SqliteServiceRepo::new(pool.clone())),
            booking_repo: Arc::new(SqliteBookingRepo::new(pool.clone())),
            job_repo: Arc::new(SqliteJobRepo::new(pool.clone())),
            auth_repo,
            auth_service,
            booking_create_lock: Arc::new(Mutex::new(())),
        }
    }
}

async fn ensure_admin_account(user_repo: &dyn UserRepository, config: &Config) {
    let existing = user_repo
        .find_by_username(&config.admin_username)
        .await
        .expect("Failed to query admin account");

    if existing.is_some() {
        return;
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(config.admin_password.as_bytes(), &salt)
        .expect("Failed to hash admin password")
        .to_string();

    let admin = User::new(NewUserParams {
        username: config.admin_username.clone(),
        password_hash,
        full_name: "Administrator".to_string(),
        phone: String::new(),
        email: String::new(),
        role: ROLE_ADMIN.to_string(),
    });

    user_repo.create(&admin).await.expect("Failed to create admin account");
    info!("Bootstrapped admin account: {}", config.admin_username);
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
