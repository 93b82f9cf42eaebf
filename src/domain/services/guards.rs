use crate::domain::models::user::{User, ROLE_ADMIN, ROLE_STAFF};
use crate::error::AppError;

pub fn is_admin(user: &User) -> bool {
    user.role == ROLE_ADMIN
}

pub fn is_active_staff(user: &User) -> bool {
    user.role == ROLE_STAFF && user.is_active
}

/// Shared ownership guard for job mutations: admins always pass; everyone
/// else must be the assigned staff member. An unassigned job is admin-only.
pub fn require_assignee_or_admin(actor: &User, assignee_id: Option<&str>) -> Result<(), AppError> {
    if is_admin(actor) {
        return Ok(());
    }
    match assignee_id {
        None => Err(AppError::Unassigned),
        Some(assignee) if assignee == actor.id => Ok(()),
        Some(_) => Err(AppError::Forbidden(
            "Permission denied. Only the assigned staff or an Administrator can update the service."
                .to_string(),
        )),
    }
}
