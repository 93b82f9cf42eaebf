use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{auth, booking, health, job, member, service};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))

        // Members (admin)
        .route("/api/v1/members", post(member::create_member).get(member::list_members))

        // Service catalog
        .route("/api/v1/services", post(service::create_service).get(service::list_services))

        // Bookings
        .route("/api/v1/bookings", post(booking::create_booking))
        .route("/api/v1/bookings/{id}", get(booking::get_booking).put(booking::update_booking).delete(booking::delete_booking))
        .route("/api/v1/bookings/{id}/status", put(booking::update_booking_status))
        .route("/api/v1/bookings/track/{code}", get(booking::track_booking))
        .route("/api/v1/me/bookings", get(booking::my_bookings))

        // Jobs within a booking
        .route("/api/v1/bookings/{id}/jobs/{job_id}/status", put(job::update_job_status))
        .route("/api/v1/bookings/{id}/jobs/{job_id}/assignee", put(job::assign_staff))
        .route("/api/v1/bookings/{id}/jobs/{job_id}/start", post(job::start_service))
        .route("/api/v1/bookings/{id}/jobs/{job_id}/complete", post(job::complete_service))
        .route("/api/v1/bookings/{id}/jobs/{job_id}/progress", get(job::job_progress))
        .route("/api/v1/me/tasks", get(job::my_tasks))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
