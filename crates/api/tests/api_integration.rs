//! Integration tests for the API server.
//!
//! The full saga runs in-process: handlers call the components directly
//! and outcome callbacks flow through the channel dispatcher, so booking
//! tests poll until the status settles in a terminal state.

use std::sync::OnceLock;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceExt;
use uuid::Uuid;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> Router {
    let (state, _dispatcher) = api::create_default_state();
    api::create_app(state, get_metrics_handle())
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("X-User-Id", user);
    }
    if let Some(token) = token {
        builder = builder.header("X-Request-Id", token);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn new_user() -> String {
    Uuid::new_v4().to_string()
}

async fn deposit(app: &Router, user: &str, cents: i64) {
    let token = Uuid::new_v4().to_string();
    let (status, _) = send(app, "POST", "/account/reserve", Some(user), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        app,
        "POST",
        "/account/deposit",
        Some(user),
        Some(&token),
        Some(serde_json::json!({ "delta": cents })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

async fn create_event(app: &Router, user: &str, price: i64, total_slots: u32) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/events",
        Some(user),
        None,
        Some(serde_json::json!({
            "name": "Concert",
            "price": price,
            "total_slots": total_slots,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

/// Polls the booking until its status is terminal, then returns it.
async fn settle_booking(app: &Router, user: &str, booking_id: &str) -> String {
    for _ in 0..200 {
        let (status, body) = send(
            app,
            "GET",
            &format!("/bookings/{booking_id}"),
            Some(user),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let state = body["status"].as_str().unwrap().to_string();
        if state == "Completed" || state == "Cancelled" {
            return state;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("booking {booking_id} did not settle");
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();
    let (status, body) = send(&app, "GET", "/health", None, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_requests_without_identity_are_rejected() {
    let app = setup();
    let (status, _) = send(&app, "GET", "/bookings", None, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/account/balance", Some("not-a-uuid"), None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_event_catalog() {
    let app = setup();
    let user = new_user();

    let event_id = create_event(&app, &user, 2000, 5).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/events/{event_id}"),
        Some(&user),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Concert");
    assert_eq!(body["price"], 2000);
    assert_eq!(body["total_slots"], 5);
    assert_eq!(body["occupied_slots"], 0);

    let (status, body) = send(&app, "GET", "/events", Some(&user), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/events/{}", Uuid::new_v4()),
        Some(&user),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_event_definition_is_rejected() {
    let app = setup();
    let user = new_user();

    let (status, _) = send(
        &app,
        "POST",
        "/events",
        Some(&user),
        None,
        Some(serde_json::json!({ "name": "", "price": 100, "total_slots": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_idempotent_deposit_scenario() {
    let app = setup();
    let user = new_user();
    let token = Uuid::new_v4().to_string();

    // Reserve the token; balance stays zero.
    let (status, _) = send(&app, "POST", "/account/reserve", Some(&user), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, "GET", "/account/balance", Some(&user), None, None).await;
    assert_eq!(body["balance"], 0);

    // Apply delta 50.
    let (status, _) = send(
        &app,
        "POST",
        "/account/deposit",
        Some(&user),
        Some(&token),
        Some(serde_json::json!({ "delta": 50 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, "GET", "/account/balance", Some(&user), None, None).await;
    assert_eq!(body["balance"], 50);

    // Replay with the same token: no second effect.
    let (status, _) = send(
        &app,
        "POST",
        "/account/deposit",
        Some(&user),
        Some(&token),
        Some(serde_json::json!({ "delta": 50 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // A fresh token that was never reserved fails too.
    let fresh = Uuid::new_v4().to_string();
    let (status, _) = send(
        &app,
        "POST",
        "/account/deposit",
        Some(&user),
        Some(&fresh),
        Some(serde_json::json!({ "delta": 50 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(&app, "GET", "/account/balance", Some(&user), None, None).await;
    assert_eq!(body["balance"], 50);
}

#[tokio::test]
async fn test_withdraw_insufficient_funds() {
    let app = setup();
    let user = new_user();
    let token = Uuid::new_v4().to_string();

    let (status, _) = send(&app, "POST", "/account/reserve", Some(&user), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/account/withdraw",
        Some(&user),
        Some(&token),
        Some(serde_json::json!({ "booking_id": Uuid::new_v4(), "amount": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_booking_completes_with_sufficient_funds() {
    let app = setup();
    let user = new_user();
    deposit(&app, &user, 20).await;
    let event_id = create_event(&app, &user, 20, 1).await;

    let (status, body) = send(
        &app,
        "POST",
        "/bookings",
        Some(&user),
        None,
        Some(serde_json::json!({ "event_id": event_id })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let booking_id = body["booking_id"].as_str().unwrap().to_string();

    assert_eq!(settle_booking(&app, &user, &booking_id).await, "Completed");

    let (_, body) = send(&app, "GET", "/account/balance", Some(&user), None, None).await;
    assert_eq!(body["balance"], 0);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/events/{event_id}"),
        Some(&user),
        None,
        None,
    )
    .await;
    assert_eq!(body["occupied_slots"], 1);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/bookings/{booking_id}"),
        Some(&user),
        None,
        None,
    )
    .await;
    assert_eq!(body["price"], 20);
}

#[tokio::test]
async fn test_booking_cancels_without_funds_and_releases_slot() {
    let app = setup();
    let user = new_user();
    let event_id = create_event(&app, &user, 20, 1).await;

    let (status, body) = send(
        &app,
        "POST",
        "/bookings",
        Some(&user),
        None,
        Some(serde_json::json!({ "event_id": event_id })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let booking_id = body["booking_id"].as_str().unwrap().to_string();

    assert_eq!(settle_booking(&app, &user, &booking_id).await, "Cancelled");

    // Compensation restored the capacity and the balance never moved.
    let (_, body) = send(&app, "GET", "/account/balance", Some(&user), None, None).await;
    assert_eq!(body["balance"], 0);
    let (_, body) = send(
        &app,
        "GET",
        &format!("/events/{event_id}"),
        Some(&user),
        None,
        None,
    )
    .await;
    assert_eq!(body["occupied_slots"], 0);
}

#[tokio::test]
async fn test_second_booking_on_full_event_is_cancelled() {
    let app = setup();
    let first = new_user();
    let second = new_user();
    deposit(&app, &first, 20).await;
    deposit(&app, &second, 20).await;
    let event_id = create_event(&app, &first, 20, 1).await;

    let (_, body) = send(
        &app,
        "POST",
        "/bookings",
        Some(&first),
        None,
        Some(serde_json::json!({ "event_id": event_id })),
    )
    .await;
    let first_booking = body["booking_id"].as_str().unwrap().to_string();
    assert_eq!(settle_booking(&app, &first, &first_booking).await, "Completed");

    let (_, body) = send(
        &app,
        "POST",
        "/bookings",
        Some(&second),
        None,
        Some(serde_json::json!({ "event_id": event_id })),
    )
    .await;
    let second_booking = body["booking_id"].as_str().unwrap().to_string();
    assert_eq!(
        settle_booking(&app, &second, &second_booking).await,
        "Cancelled"
    );

    // The losing user keeps their money.
    let (_, body) = send(&app, "GET", "/account/balance", Some(&second), None, None).await;
    assert_eq!(body["balance"], 20);
}

#[tokio::test]
async fn test_booking_lookup_errors() {
    let app = setup();
    let user = new_user();

    let (status, _) = send(
        &app,
        "GET",
        &format!("/bookings/{}", Uuid::new_v4()),
        Some(&user),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/bookings/not-a-uuid", Some(&user), None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_for_unknown_booking_is_rejected() {
    let app = setup();
    let user = new_user();

    let (status, _) = send(
        &app,
        "POST",
        "/bookings/callback/reservation",
        Some(&user),
        None,
        Some(serde_json::json!({
            "booking_id": Uuid::new_v4(),
            "user_id": user,
            "price": 20,
            "success": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    let user = new_user();
    deposit(&app, &user, 50).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
