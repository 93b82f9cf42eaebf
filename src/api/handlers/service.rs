use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::CreateServiceRequest;
use crate::domain::models::service::Service;
use crate::domain::services::guards::is_admin;
use std::sync::Arc;
use tracing::info;

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<CreateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !is_admin(&actor) {
        return Err(AppError::Forbidden("Permission denied.".into()));
    }

    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Service name is required.".into()));
    }
    if payload.price < 0 {
        return Err(AppError::Validation("Price must not be negative.".into()));
    }
    if payload.duration_minutes <= 0 {
        return Err(AppError::Validation("Duration must be positive.".into()));
    }

    let service = Service::new(
        payload.name,
        payload.description,
        payload.price,
        payload.duration_minutes,
    );
    let created = state.service_repo.create(&service).await?;

    info!("Service created: {}", created.id);

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let services = state.service_repo.list_active().await?;
    Ok(Json(services))
}
