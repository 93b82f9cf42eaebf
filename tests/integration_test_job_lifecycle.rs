mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{AuthHeaders, TestApp};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn auth_request(method: &str, uri: &str, auth: &AuthHeaders, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, format!("access_token={}", auth.access_token))
        .header("X-CSRF-Token", &auth.csrf_token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn create_staff(app: &TestApp, admin: &AuthHeaders, username: &str) -> String {
    let res = app.router.clone().oneshot(auth_request(
        "POST", "/api/v1/members", admin,
        json!({
            "username": username, "password": "staff-password", "full_name": username,
            "phone": "0123456789", "email": format!("{}@example.com", username), "role": "STAFF"
        }),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    parse_body(res).await["id"].as_str().unwrap().to_string()
}

/// Books one job assigned to the single staff member that exists so far.
/// Returns (booking_id, job_id).
async fn setup_single_job(app: &TestApp, admin: &AuthHeaders) -> (String, String) {
    let service_res = app.router.clone().oneshot(auth_request(
        "POST", "/api/v1/services", admin,
        json!({ "name": "Basic Wash", "description": null, "price": 500, "duration_minutes": 60 }),
    )).await.unwrap();
    assert_eq!(service_res.status(), StatusCode::CREATED);
    let service_id = parse_body(service_res).await["id"].as_str().unwrap().to_string();

    let booking_res = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/bookings")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "guest_name": "Jamie Guest",
                "guest_phone": "0987654321",
                "guest_email": "jamie@example.com",
                "booking_datetime": "2026-09-10T09:00:00Z",
                "items": [{ "service_id": service_id, "vehicle_description": "blue sedan" }]
            }).to_string()))
            .unwrap()
    ).await.unwrap();
    assert_eq!(booking_res.status(), StatusCode::CREATED);
    let body = parse_body(booking_res).await;
    let booking_id = body["booking_id"].as_str().unwrap().to_string();

    let detail = app.router.clone().oneshot(auth_request(
        "GET",
        &format!("/api/v1/bookings/{booking_id}"),
        admin,
        json!({}),
    )).await.unwrap();
    let job_id = parse_body(detail).await["jobs"][0]["id"].as_str().unwrap().to_string();

    (booking_id, job_id)
}

async fn check_in(app: &TestApp, admin: &AuthHeaders, booking_id: &str) {
    let res = app.router.clone().oneshot(auth_request(
        "PUT",
        &format!("/api/v1/bookings/{booking_id}/status"),
        admin,
        json!({ "new_status": "CheckedIn" }),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

async fn job_json(app: &TestApp, admin: &AuthHeaders, booking_id: &str, job_id: &str) -> Value {
    let res = app.router.clone().oneshot(auth_request(
        "GET",
        &format!("/api/v1/bookings/{booking_id}"),
        admin,
        json!({}),
    )).await.unwrap();
    let body = parse_body(res).await;
    body["jobs"].as_array().unwrap().iter()
        .find(|j| j["id"] == job_id)
        .cloned()
        .expect("job not in booking")
}

#[tokio::test]
async fn job_status_is_frozen_until_check_in() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    create_staff(&app, &admin, "staff1").await;
    let (booking_id, job_id) = setup_single_job(&app, &admin).await;

    let res = app.router.clone().oneshot(auth_request(
        "PUT",
        &format!("/api/v1/bookings/{booking_id}/jobs/{job_id}/status"),
        &admin,
        json!({ "new_status": "Cancelled" }),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let body = parse_body(res).await;
    assert_eq!(body["code"], "BOOKING_NOT_READY");
}

#[tokio::test]
async fn generic_endpoint_refuses_privileged_targets() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    create_staff(&app, &admin, "staff1").await;
    let (booking_id, job_id) = setup_single_job(&app, &admin).await;
    check_in(&app, &admin, &booking_id).await;

    for target in ["ServiceInProgress", "Completed"] {
        let res = app.router.clone().oneshot(auth_request(
            "PUT",
            &format!("/api/v1/bookings/{booking_id}/jobs/{job_id}/status"),
            &admin,
            json!({ "new_status": target }),
        )).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = parse_body(res).await;
        assert_eq!(body["code"], "INVALID_ACTION");
    }
}

#[tokio::test]
async fn only_the_assignee_can_start_the_service() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    create_staff(&app, &admin, "staff1").await;
    let (booking_id, job_id) = setup_single_job(&app, &admin).await;
    // Second staff member joins after scheduling, so the job belongs to staff1.
    create_staff(&app, &admin, "staff2").await;
    check_in(&app, &admin, &booking_id).await;

    let start_uri = format!("/api/v1/bookings/{booking_id}/jobs/{job_id}/start");

    let outsider = app.login("staff2", "staff-password").await;
    let res = app.router.clone().oneshot(auth_request("POST", &start_uri, &outsider, json!({}))).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Admins may not start on the assignee's behalf either.
    let res = app.router.clone().oneshot(auth_request("POST", &start_uri, &admin, json!({}))).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Denied starts leave no trace: only the creation entry exists.
    let res = app.router.clone().oneshot(auth_request(
        "GET",
        &format!("/api/v1/bookings/{booking_id}/jobs/{job_id}/progress"),
        &admin,
        json!({}),
    )).await.unwrap();
    let body = parse_body(res).await;
    let steps = body["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0]["status"], "Scheduled");

    let assignee = app.login("staff1", "staff-password").await;
    let res = app.router.clone().oneshot(auth_request("POST", &start_uri, &assignee, json!({}))).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let job = job_json(&app, &admin, &booking_id, &job_id).await;
    assert_eq!(job["status"], "ServiceInProgress");
    assert!(job["actual_start_time"].is_string());

    // Starting twice is an illegal transition.
    let res = app.router.clone().oneshot(auth_request("POST", &start_uri, &assignee, json!({}))).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn full_job_path_with_quality_check_and_completion() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    create_staff(&app, &admin, "staff1").await;
    let (booking_id, job_id) = setup_single_job(&app, &admin).await;
    check_in(&app, &admin, &booking_id).await;

    let assignee = app.login("staff1", "staff-password").await;
    let start = app.router.clone().oneshot(auth_request(
        "POST",
        &format!("/api/v1/bookings/{booking_id}/jobs/{job_id}/start"),
        &assignee,
        json!({}),
    )).await.unwrap();
    assert_eq!(start.status(), StatusCode::NO_CONTENT);

    let status_uri = format!("/api/v1/bookings/{booking_id}/jobs/{job_id}/status");
    let complete_uri = format!("/api/v1/bookings/{booking_id}/jobs/{job_id}/complete");

    let res = app.router.clone().oneshot(auth_request(
        "PUT", &status_uri, &assignee, json!({ "new_status": "QualityCheck" }),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // QualityCheck does not lead straight to Completed.
    let res = app.router.clone().oneshot(auth_request(
        "POST", &complete_uri, &assignee, json!({}),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app.router.clone().oneshot(auth_request(
        "PUT", &status_uri, &assignee, json!({ "new_status": "ReadyForPickup" }),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // Completion is open to the admin as well as the assignee.
    let res = app.router.clone().oneshot(auth_request(
        "POST", &complete_uri, &admin, json!({ "note": "spotless" }),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let job = job_json(&app, &admin, &booking_id, &job_id).await;
    assert_eq!(job["status"], "Completed");
    assert!(job["actual_end_time"].is_string());

    let progress = app.router.clone().oneshot(auth_request(
        "GET",
        &format!("/api/v1/bookings/{booking_id}/jobs/{job_id}/progress"),
        &admin,
        json!({}),
    )).await.unwrap();
    assert_eq!(progress.status(), StatusCode::OK);

    let body = parse_body(progress).await;
    let steps = body["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 5);
    assert_eq!(steps[0]["status"], "Scheduled");
    assert_eq!(steps[0]["note"], "Appointment has been automatically created by the system.");
    assert!(steps[0]["created_by_user_id"].is_null());
    assert_eq!(steps[1]["status"], "ServiceInProgress");
    assert_eq!(steps[4]["status"], "Completed");
    assert_eq!(steps[4]["note"], "spotless");

    // Completed is terminal: every mutation path rejects from here.
    let staff2_id = create_staff(&app, &admin, "staff2").await;

    let res = app.router.clone().oneshot(auth_request(
        "PUT", &status_uri, &admin, json!({ "new_status": "Cancelled" }),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app.router.clone().oneshot(auth_request(
        "POST",
        &format!("/api/v1/bookings/{booking_id}/jobs/{job_id}/start"),
        &assignee,
        json!({}),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app.router.clone().oneshot(auth_request(
        "POST", &complete_uri, &admin, json!({}),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app.router.clone().oneshot(auth_request(
        "PUT",
        &format!("/api/v1/bookings/{booking_id}/jobs/{job_id}/assignee"),
        &admin,
        json!({ "new_assignee_id": staff2_id }),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn rework_loop_returns_to_service_in_progress() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    create_staff(&app, &admin, "staff1").await;
    let (booking_id, job_id) = setup_single_job(&app, &admin).await;
    check_in(&app, &admin, &booking_id).await;

    let assignee = app.login("staff1", "staff-password").await;
    let start_uri = format!("/api/v1/bookings/{booking_id}/jobs/{job_id}/start");
    let status_uri = format!("/api/v1/bookings/{booking_id}/jobs/{job_id}/status");

    let res = app.router.clone().oneshot(auth_request("POST", &start_uri, &assignee, json!({}))).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = app.router.clone().oneshot(auth_request(
        "PUT", &status_uri, &assignee, json!({ "new_status": "IssueReported", "note": "paint scratch found" }),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let job = job_json(&app, &admin, &booking_id, &job_id).await;
    assert_eq!(job["status"], "IssueReported");

    // Resuming after an issue goes through the start action again.
    let res = app.router.clone().oneshot(auth_request("POST", &start_uri, &assignee, json!({}))).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let job = job_json(&app, &admin, &booking_id, &job_id).await;
    assert_eq!(job["status"], "ServiceInProgress");
}

#[tokio::test]
async fn assignment_rules() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    create_staff(&app, &admin, "staff1").await;
    let (booking_id, job_id) = setup_single_job(&app, &admin).await;
    let staff2_id = create_staff(&app, &admin, "staff2").await;

    let assignee_uri = format!("/api/v1/bookings/{booking_id}/jobs/{job_id}/assignee");

    // Staff cannot reassign work.
    let staff1 = app.login("staff1", "staff-password").await;
    let res = app.router.clone().oneshot(auth_request(
        "PUT", &assignee_uri, &staff1, json!({ "new_assignee_id": staff2_id }),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The target must be an active staff member.
    let res = app.router.clone().oneshot(auth_request(
        "PUT", &assignee_uri, &admin, json!({ "new_assignee_id": "no-such-user" }),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.router.clone().oneshot(auth_request(
        "PUT", &assignee_uri, &admin, json!({ "new_assignee_id": staff2_id }),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let job = job_json(&app, &admin, &booking_id, &job_id).await;
    assert_eq!(job["assignee_id"], staff2_id);

    // Reassignment is blocked once the job reaches a late or terminal state.
    check_in(&app, &admin, &booking_id).await;
    let staff2 = app.login("staff2", "staff-password").await;
    let start = app.router.clone().oneshot(auth_request(
        "POST",
        &format!("/api/v1/bookings/{booking_id}/jobs/{job_id}/start"),
        &staff2,
        json!({}),
    )).await.unwrap();
    assert_eq!(start.status(), StatusCode::NO_CONTENT);
    let qc = app.router.clone().oneshot(auth_request(
        "PUT",
        &format!("/api/v1/bookings/{booking_id}/jobs/{job_id}/status"),
        &staff2,
        json!({ "new_status": "QualityCheck" }),
    )).await.unwrap();
    assert_eq!(qc.status(), StatusCode::NO_CONTENT);

    let res = app.router.clone().oneshot(auth_request(
        "PUT", &assignee_uri, &admin, json!({ "new_assignee_id": staff2_id }),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn progress_history_is_hidden_from_unrelated_customers() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    create_staff(&app, &admin, "staff1").await;
    let (booking_id, job_id) = setup_single_job(&app, &admin).await;

    let register = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({
                "username": "casey", "password": "customer-password",
                "full_name": "Casey Customer", "phone": "07", "email": "c@example.com"
            }).to_string()))
            .unwrap()
    ).await.unwrap();
    assert_eq!(register.status(), StatusCode::CREATED);

    let progress_uri = format!("/api/v1/bookings/{booking_id}/jobs/{job_id}/progress");

    let customer = app.login("casey", "customer-password").await;
    let res = app.router.clone().oneshot(auth_request("GET", &progress_uri, &customer, json!({}))).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let staff = app.login("staff1", "staff-password").await;
    let res = app.router.clone().oneshot(auth_request("GET", &progress_uri, &staff, json!({}))).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn my_tasks_lists_jobs_assigned_to_the_caller() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    create_staff(&app, &admin, "staff1").await;
    let (_, job_id) = setup_single_job(&app, &admin).await;

    let staff1 = app.login("staff1", "staff-password").await;
    let res = app.router.clone().oneshot(
        Request::builder()
            .uri("/api/v1/me/tasks")
            .header(header::COOKIE, format!("access_token={}", staff1.access_token))
            .body(Body::empty())
            .unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let tasks = parse_body(res).await;
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], job_id);
}
