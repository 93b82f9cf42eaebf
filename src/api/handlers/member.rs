use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::CreateMemberRequest;
use crate::domain::models::user::{NewUserParams, User, ROLE_ADMIN, ROLE_STAFF, ROLE_CUSTOMER};
use crate::domain::services::guards::is_admin;
use std::sync::Arc;
use argon2::{password_hash::{PasswordHasher, SaltString}, Argon2};
use rand::rngs::OsRng;
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
pub struct MemberResponse {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
}

impl From<User> for MemberResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            full_name: u.full_name,
            phone: u.phone,
            email: u.email,
            role: u.role,
            is_active: u.is_active,
        }
    }
}

pub async fn create_member(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
    Json(payload): Json<CreateMemberRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !is_admin(&actor) {
        return Err(AppError::Forbidden("Permission denied.".into()));
    }

    let role = payload.role.to_uppercase();
    if ![ROLE_ADMIN, ROLE_STAFF, ROLE_CUSTOMER].contains(&role.as_str()) {
        return Err(AppError::Validation("Invalid role.".into()));
    }

    if state.user_repo.find_by_username(&payload.username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".into()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|_| AppError::Internal)?
        .to_string();

    let user = User::new(NewUserParams {
        username: payload.username,
        password_hash,
        full_name: payload.full_name,
        phone: payload.phone.unwrap_or_default(),
        email: payload.email.unwrap_or_default(),
        role,
    });
    let created = state.user_repo.create(&user).await?;

    info!("Member created: {} ({})", created.id, created.role);

    Ok((StatusCode::CREATED, Json(MemberResponse::from(created))))
}

pub async fn list_members(
    State(state): State<Arc<AppState>>,
    AuthUser(actor): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    if !is_admin(&actor) {
        return Err(AppError::Forbidden("Permission denied.".into()));
    }

    let users = state.user_repo.list().await?;
    let members: Vec<MemberResponse> = users.into_iter().map(MemberResponse::from).collect();
    Ok(Json(members))
}
