use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::domain::models::status::BookingStatus;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Invalid service: {0}")]
    ServiceInvalid(String),
    #[error("Scheduling failed: {0}")]
    SchedulingFailed(String),
    #[error("Cannot transition from status '{from}' to '{to}'.")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    #[error("Cannot update service status while the main booking has not been checked in.")]
    BookingNotReady,
    #[error("This service is unassigned and can only be managed by an Administrator.")]
    Unassigned,
    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Stable machine-readable code carried in every error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden(_) => "PERMISSION_DENIED",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION",
            AppError::ServiceInvalid(_) => "SERVICE_INVALID",
            AppError::SchedulingFailed(_) => "SCHEDULING_FAILED",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::InvalidAction(_) => "INVALID_ACTION",
            AppError::BookingNotReady => "BOOKING_NOT_READY",
            AppError::Unassigned => "UNASSIGNED",
            AppError::Internal => "INTERNAL",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    let sql_code = db_err.code().unwrap_or_default();

                    // 2067 = SQLite Unique Constraint
                    // 23505 = PostgreSQL Unique Violation
                    if sql_code == "2067" || sql_code == "23505" {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({ "code": "CONFLICT", "error": "Resource already exists (duplicate entry)" }))
                        ).into_response();
                    }
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::ServiceInvalid(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::SchedulingFailed(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::InvalidTransition { .. } => (StatusCode::CONFLICT, self.to_string()),
            AppError::InvalidAction(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::BookingNotReady => (StatusCode::CONFLICT, self.to_string()),
            AppError::Unassigned => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
        };

        (status, Json(json!({ "code": code, "error": message }))).into_response()
    }
}
