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

fn public_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn create_staff(app: &TestApp, auth: &AuthHeaders, username: &str) -> String {
    let res = app.router.clone().oneshot(auth_request(
        "POST",
        "/api/v1/members",
        auth,
        json!({
            "username": username,
            "password": "staff-password",
            "full_name": username,
            "phone": "0123456789",
            "email": format!("{}@example.com", username),
            "role": "STAFF"
        }),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    parse_body(res).await["id"].as_str().unwrap().to_string()
}

async fn create_service(app: &TestApp, auth: &AuthHeaders, name: &str, price: i64, duration: i32) -> String {
    let res = app.router.clone().oneshot(auth_request(
        "POST",
        "/api/v1/services",
        auth,
        json!({
            "name": name,
            "description": "test service",
            "price": price,
            "duration_minutes": duration
        }),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    parse_body(res).await["id"].as_str().unwrap().to_string()
}

fn guest_booking(datetime: &str, items: Value) -> Value {
    json!({
        "guest_name": "Jamie Guest",
        "guest_phone": "0987654321",
        "guest_email": "jamie@example.com",
        "booking_datetime": datetime,
        "items": items,
        "note": "please be careful with the rims"
    })
}

#[tokio::test]
async fn creates_booking_with_jobs_spread_across_staff() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;

    create_staff(&app, &admin, "staff1").await;
    create_staff(&app, &admin, "staff2").await;
    let wash = create_service(&app, &admin, "Basic Wash", 500, 60).await;
    let detail = create_service(&app, &admin, "Full Detail", 1500, 90).await;

    let res = app.router.clone().oneshot(public_request(
        "POST",
        "/api/v1/bookings",
        guest_booking("2026-09-10T09:00:00Z", json!([
            { "service_id": wash, "vehicle_description": "blue sedan" },
            { "service_id": detail, "vehicle_description": "white SUV" }
        ])),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = parse_body(res).await;
    let code = body["booking_code"].as_str().unwrap();
    assert!(code.starts_with("WB20260910-"), "unexpected code: {code}");

    let track = app.router.clone().oneshot(
        Request::builder()
            .uri(format!("/api/v1/bookings/track/{code}"))
            .body(Body::empty())
            .unwrap()
    ).await.unwrap();
    assert_eq!(track.status(), StatusCode::OK);

    let booking = parse_body(track).await;
    assert_eq!(booking["status"], "Scheduled");
    assert_eq!(booking["total_amount"], 2000);
    assert_eq!(booking["customer_name"], "Jamie Guest");

    let jobs = booking["jobs"].as_array().unwrap();
    assert_eq!(jobs.len(), 2);

    // Both jobs start at the requested time on different staff members.
    for job in jobs {
        assert_eq!(job["status"], "Scheduled");
        assert_eq!(job["planned_start_time"], "2026-09-10T09:00:00Z");
        assert!(job["assignee_id"].is_string());
    }
    assert_ne!(jobs[0]["assignee_id"], jobs[1]["assignee_id"]);

    // Planned ends include the 10 minute buffer.
    let detail_job = jobs.iter().find(|j| j["service_id"] == Value::String(detail.clone())).unwrap();
    let wash_job = jobs.iter().find(|j| j["service_id"] == Value::String(wash.clone())).unwrap();
    assert_eq!(detail_job["planned_end_time"], "2026-09-10T10:40:00Z");
    assert_eq!(wash_job["planned_end_time"], "2026-09-10T10:10:00Z");
}

#[tokio::test]
async fn rejects_when_single_staff_cannot_take_both_jobs() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;

    create_staff(&app, &admin, "solo").await;
    let wash = create_service(&app, &admin, "Basic Wash", 500, 60).await;
    let detail = create_service(&app, &admin, "Full Detail", 1500, 90).await;

    let res = app.router.clone().oneshot(public_request(
        "POST",
        "/api/v1/bookings",
        guest_booking("2026-09-10T09:00:00Z", json!([
            { "service_id": wash, "vehicle_description": "blue sedan" },
            { "service_id": detail, "vehicle_description": "white SUV" }
        ])),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let body = parse_body(res).await;
    assert_eq!(body["code"], "SCHEDULING_FAILED");
    assert_eq!(body["error"], "Unable to find a suitable schedule. The time slot is full.");
}

#[tokio::test]
async fn rejects_when_no_staff_exists() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let wash = create_service(&app, &admin, "Basic Wash", 500, 60).await;

    let res = app.router.clone().oneshot(public_request(
        "POST",
        "/api/v1/bookings",
        guest_booking("2026-09-10T09:00:00Z", json!([
            { "service_id": wash, "vehicle_description": "blue sedan" }
        ])),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let body = parse_body(res).await;
    assert_eq!(body["error"], "No staff available to serve.");
}

#[tokio::test]
async fn earlier_commitments_block_the_slot_until_they_end() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;

    create_staff(&app, &admin, "solo").await;
    let wash = create_service(&app, &admin, "Basic Wash", 500, 60).await;

    let first = app.router.clone().oneshot(public_request(
        "POST",
        "/api/v1/bookings",
        guest_booking("2026-09-10T09:00:00Z", json!([
            { "service_id": wash, "vehicle_description": "blue sedan" }
        ])),
    )).await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    // Same slot again: the only staff member is already committed.
    let overlapping = app.router.clone().oneshot(public_request(
        "POST",
        "/api/v1/bookings",
        guest_booking("2026-09-10T09:30:00Z", json!([
            { "service_id": wash, "vehicle_description": "red coupe" }
        ])),
    )).await.unwrap();
    assert_eq!(overlapping.status(), StatusCode::CONFLICT);

    // Back-to-back at the previous planned end (09:00 + 60 + 10 buffer) works.
    let adjacent = app.router.clone().oneshot(public_request(
        "POST",
        "/api/v1/bookings",
        guest_booking("2026-09-10T10:10:00Z", json!([
            { "service_id": wash, "vehicle_description": "red coupe" }
        ])),
    )).await.unwrap();
    assert_eq!(adjacent.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn guest_contact_details_are_required() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    create_staff(&app, &admin, "staff1").await;
    let wash = create_service(&app, &admin, "Basic Wash", 500, 60).await;

    let res = app.router.clone().oneshot(public_request(
        "POST",
        "/api/v1/bookings",
        json!({
            "guest_name": "Jamie Guest",
            "booking_datetime": "2026-09-10T09:00:00Z",
            "items": [{ "service_id": wash, "vehicle_description": "blue sedan" }]
        }),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = parse_body(res).await;
    assert_eq!(body["error"], "Guest name, phone number, and email are required.");
}

#[tokio::test]
async fn rejects_empty_item_list_and_unknown_services() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    create_staff(&app, &admin, "staff1").await;

    let empty = app.router.clone().oneshot(public_request(
        "POST",
        "/api/v1/bookings",
        guest_booking("2026-09-10T09:00:00Z", json!([])),
    )).await.unwrap();
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let unknown = app.router.clone().oneshot(public_request(
        "POST",
        "/api/v1/bookings",
        guest_booking("2026-09-10T09:00:00Z", json!([
            { "service_id": "does-not-exist", "vehicle_description": "blue sedan" }
        ])),
    )).await.unwrap();
    assert_eq!(unknown.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = parse_body(unknown).await;
    assert_eq!(body["code"], "SERVICE_INVALID");
}

#[tokio::test]
async fn logged_in_customer_books_under_their_profile() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    create_staff(&app, &admin, "staff1").await;
    let wash = create_service(&app, &admin, "Basic Wash", 500, 60).await;

    let register = app.router.clone().oneshot(public_request(
        "POST",
        "/api/v1/auth/register",
        json!({
            "username": "casey",
            "password": "customer-password",
            "full_name": "Casey Customer",
            "phone": "0777777777",
            "email": "casey@example.com"
        }),
    )).await.unwrap();
    assert_eq!(register.status(), StatusCode::CREATED);

    let customer = app.login("casey", "customer-password").await;

    let res = app.router.clone().oneshot(auth_request(
        "POST",
        "/api/v1/bookings",
        &customer,
        json!({
            "booking_datetime": "2026-09-10T09:00:00Z",
            "items": [{ "service_id": wash, "vehicle_description": "blue sedan" }]
        }),
    )).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let mine = app.router.clone().oneshot(
        Request::builder()
            .uri("/api/v1/me/bookings")
            .header(header::COOKIE, format!("access_token={}", customer.access_token))
            .body(Body::empty())
            .unwrap()
    ).await.unwrap();
    assert_eq!(mine.status(), StatusCode::OK);

    let bookings = parse_body(mine).await;
    let bookings = bookings.as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["customer_name"], "Casey Customer");
    assert_eq!(bookings[0]["customer_email"], "casey@example.com");
}
