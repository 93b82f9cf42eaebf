use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_STAFF: &str = "STAFF";
pub const ROLE_CUSTOMER: &str = "CUSTOMER";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewUserParams {
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub role: String,
}

impl User {
    pub fn new(params: NewUserParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: params.username,
            password_hash: params.password_hash,
            full_name: params.full_name,
            phone: params.phone,
            email: params.email,
            role: params.role,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
