pub mod auth_service;
pub mod booking_code;
pub mod guards;
pub mod scheduling;
