pub mod auth;
pub mod booking;
pub mod job;
pub mod progress;
pub mod service;
pub mod status;
pub mod user;
