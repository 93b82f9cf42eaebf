pub mod auth;
pub mod booking;
pub mod health;
pub mod job;
pub mod member;
pub mod service;
