use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use coachbook::config::AppConfig;
use coachbook::db;
use coachbook::state::AppState;

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
        admin_token: "test-token".to_string(),
        business_name: "Bright Path Coaching".to_string(),
        max_calendar_days: 93,
    }
}

fn test_state() -> Arc<AppState> {
    let conn = db::init_db(":memory:").unwrap();
    Arc::new(AppState::new(conn, test_config()))
}

fn test_app(state: Arc<AppState>) -> Router {
    coachbook::build_router(state)
}

async fn send(state: &Arc<AppState>, req: Request<Body>) -> (StatusCode, Value) {
    let res = test_app(state.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Authorization", "Bearer test-token")
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", "Bearer test-token")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// 2030-01-07 is a Monday; 2030-01-02 and 2030-01-09 are Wednesdays.

async fn create_appointment_type(state: &Arc<AppState>) -> i64 {
    let (status, json) = send(
        state,
        admin_post(
            "/api/catalog/appointment-types",
            json!({
                "title": "30-Minute Check-in",
                "price": "75",
                "duration": 30,
                "date_range_days": 60,
                "weekly_availability": [
                    {"day": "Mon", "enabled": true, "slots": [{"from": "09:00", "to": "10:00"}]},
                    {"day": "Tue", "enabled": false, "slots": []}
                ],
                "allow_rescheduling": true,
                "reschedule_hours": 24
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json["id"].as_i64().unwrap()
}

async fn create_class(state: &Arc<AppState>) -> i64 {
    let (status, json) = send(
        state,
        admin_post(
            "/api/catalog/classes",
            json!({
                "title": "Weekly Group Mindset Call",
                "price": "25",
                "duration": 60,
                "max_entries": 20,
                "schedule": {
                    "days": ["Wed"],
                    "start_time": "19:00",
                    "start_date": "2030-01-01",
                    "end_date": "2030-03-31"
                },
                "allow_rescheduling": false
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json["id"].as_i64().unwrap()
}

async fn book(state: &Arc<AppState>, body: Value) -> (StatusCode, Value) {
    send(state, post_json("/api/bookings", body)).await
}

async fn book_slot(state: &Arc<AppState>, appt_id: i64, date: &str, slot: &str) -> (StatusCode, Value) {
    book(
        state,
        json!({
            "customer_id": 1,
            "service_type": "appointment",
            "service_id": appt_id,
            "date": date,
            "slot": slot
        }),
    )
    .await
}

async fn slots(state: &Arc<AppState>, appt_id: i64, date: &str) -> Vec<String> {
    let (status, json) = send(
        state,
        get(&format!("/api/appointments/{appt_id}/slots?date={date}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_value(json["slots"].clone()).unwrap()
}

// ── Health & Auth ──

#[tokio::test]
async fn test_health() {
    let state = test_state();
    let (status, json) = send(&state, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_catalog_writes_require_auth() {
    let state = test_state();
    let body = json!({"title": "Deep Dive", "date": "2030-01-07", "time": "10:00", "duration": 90});

    let (status, _) = send(&state, post_json("/api/catalog/sessions", body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .method("POST")
        .uri("/api/catalog/sessions")
        .header("Authorization", "Bearer wrong-token")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, _) = send(&state, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_calendar_feed_requires_auth() {
    let state = test_state();
    let (status, json) = send(&state, get("/api/calendar?start=2030-01-01&end=2030-01-31")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "unauthorized");
}

// ── Catalog ──

#[tokio::test]
async fn test_catalog_upsert_and_list() {
    let state = test_state();
    create_appointment_type(&state).await;
    create_class(&state).await;

    let (status, session) = send(
        &state,
        admin_post(
            "/api/catalog/sessions",
            json!({
                "title": "Deep Dive Coaching Session",
                "price": "150",
                "date": "2030-01-08",
                "time": "10:00",
                "duration": 90,
                "session_type": "1-on-1"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let session_id = session["id"].as_i64().unwrap();

    // Update in place.
    let mut updated = session.clone();
    updated["title"] = json!("Deep Dive (Extended)");
    updated["duration"] = json!(120);
    let (status, _) = send(&state, admin_post("/api/catalog/sessions", updated)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&state, get("/api/catalog")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sessions"].as_array().unwrap().len(), 1);
    assert_eq!(json["sessions"][0]["id"], session_id);
    assert_eq!(json["sessions"][0]["title"], "Deep Dive (Extended)");
    assert_eq!(json["sessions"][0]["duration"], 120);
    assert_eq!(json["classes"][0]["schedule"]["days"][0], "Wed");
    assert_eq!(json["classes"][0]["schedule"]["start_time"], "19:00");
    assert_eq!(
        json["appointment_types"][0]["weekly_availability"][0]["slots"][0]["from"],
        "09:00"
    );
}

#[tokio::test]
async fn test_catalog_rejects_invalid_availability() {
    let state = test_state();
    let (status, json) = send(
        &state,
        admin_post(
            "/api/catalog/appointment-types",
            json!({
                "title": "Broken",
                "duration": 30,
                "weekly_availability": [
                    {"day": "Mon", "enabled": true, "slots": [{"from": "10:00", "to": "09:00"}]}
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("invalid input"));

    let (status, _) = send(
        &state,
        admin_post(
            "/api/catalog/classes",
            json!({
                "title": "Broken",
                "duration": 60,
                "schedule": {"days": ["Funday"], "start_time": "19:00", "start_date": "2030-01-01"}
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_catalog_rejects_out_of_range_durations() {
    let state = test_state();
    let (status, _) = send(
        &state,
        admin_post(
            "/api/catalog/sessions",
            json!({"title": "Endless", "date": "2030-01-08", "time": "10:00", "duration": 200_000_000_000_000_000_i64}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &state,
        admin_post(
            "/api/catalog/sessions",
            json!({"title": "Instant", "date": "2030-01-08", "time": "10:00", "duration": 0}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &state,
        admin_post(
            "/api/catalog/appointment-types",
            json!({
                "title": "Forever Open",
                "duration": 30,
                "date_range_days": 100_000,
                "weekly_availability": [
                    {"day": "Mon", "enabled": true, "slots": [{"from": "09:00", "to": "10:00"}]}
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The shared connection is still usable.
    let (status, json) = send(
        &state,
        admin_get("/api/calendar?start=2030-01-01&end=2030-01-31"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_unknown_service_is_not_found() {
    let state = test_state();
    let (status, _) = send(
        &state,
        admin_post(
            "/api/catalog/sessions",
            json!({"id": 42, "title": "Ghost", "date": "2030-01-07", "time": "10:00", "duration": 30}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_toggle_and_delete() {
    let state = test_state();
    let appt_id = create_appointment_type(&state).await;

    let (status, json) = send(
        &state,
        admin_post(&format!("/api/catalog/appointment-types/{appt_id}/toggle"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "paused");

    // Paused services cannot be booked.
    let (status, _) = book_slot(&state, appt_id, "2030-01-07", "9:00 AM").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) = send(
        &state,
        admin_post(&format!("/api/catalog/appointment/{appt_id}/toggle"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "active");

    let delete = |id: i64| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/catalog/appointment-types/{id}"))
            .header("Authorization", "Bearer test-token")
            .body(Body::empty())
            .unwrap()
    };
    let (status, _) = send(&state, delete(appt_id)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&state, delete(appt_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &state,
        admin_post("/api/catalog/widgets/1/toggle", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Occurrences & Availability ──

#[tokio::test]
async fn test_class_occurrences() {
    let state = test_state();
    let class_id = create_class(&state).await;

    let (status, json) = send(
        &state,
        get(&format!(
            "/api/classes/{class_id}/occurrences?from=2030-01-01&to=2030-01-20"
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["start_time"], "19:00");
    assert_eq!(
        json["dates"],
        json!(["2030-01-02", "2030-01-09", "2030-01-16"])
    );

    let (status, _) = send(&state, get("/api/classes/999/occurrences")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_slots_for_monday() {
    let state = test_state();
    let appt_id = create_appointment_type(&state).await;

    assert_eq!(slots(&state, appt_id, "2030-01-07").await, vec!["9:00 AM", "9:30 AM"]);
    // Tuesday is disabled, Wednesday is absent.
    assert!(slots(&state, appt_id, "2030-01-08").await.is_empty());
    assert!(slots(&state, appt_id, "2030-01-09").await.is_empty());
}

#[tokio::test]
async fn test_bookable_dates_summary() {
    let state = test_state();
    let appt_id = create_appointment_type(&state).await;

    let (status, json) = send(&state, get(&format!("/api/appointments/{appt_id}/dates"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["availability"], "Mon: 09:00-10:00");
    let dates = json["dates"].as_array().unwrap();
    // Roughly one Monday a week over a 60-day horizon.
    assert!(dates.len() >= 8 && dates.len() <= 9);
}

// ── Booking lifecycle ──

#[tokio::test]
async fn test_book_appointment_removes_slot() {
    let state = test_state();
    let appt_id = create_appointment_type(&state).await;

    let (status, json) = book_slot(&state, appt_id, "2030-01-07", "9:00 AM").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "confirmed");
    assert_eq!(json["service_type"], "appointment");
    assert_eq!(json["service_title"], "30-Minute Check-in");
    assert_eq!(json["event_date"], "2030-01-07");
    assert_eq!(json["event_time"], "09:00");

    assert_eq!(slots(&state, appt_id, "2030-01-07").await, vec!["9:30 AM"]);
}

#[tokio::test]
async fn test_double_booking_is_rejected() {
    let state = test_state();
    let appt_id = create_appointment_type(&state).await;

    let (status, _) = book_slot(&state, appt_id, "2030-01-07", "9:30 AM").await;
    assert_eq!(status, StatusCode::CREATED);

    // Same slot, given as HH:MM this time.
    let (status, json) = book_slot(&state, appt_id, "2030-01-07", "09:30").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("9:30 AM"));
}

#[tokio::test]
async fn test_booking_outside_availability_is_rejected() {
    let state = test_state();
    let appt_id = create_appointment_type(&state).await;

    let (status, _) = book_slot(&state, appt_id, "2030-01-07", "3:00 PM").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = book(
        &state,
        json!({"customer_id": 1, "service_type": "appointment", "service_id": appt_id, "date": "2030-01-07"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = book_slot(&state, 999, "2030-01-07", "9:00 AM").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_book_class_on_meeting_day_only() {
    let state = test_state();
    let class_id = create_class(&state).await;

    let (status, _) = book(
        &state,
        json!({"customer_id": 2, "service_type": "class", "service_id": class_id, "date": "2030-01-08"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = book(
        &state,
        json!({"customer_id": 2, "service_type": "class", "service_id": class_id, "date": "2030-01-09"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["event_time"], "19:00");
}

#[tokio::test]
async fn test_cancel_is_idempotent_and_frees_slot() {
    let state = test_state();
    let appt_id = create_appointment_type(&state).await;
    let (_, booking) = book_slot(&state, appt_id, "2030-01-07", "9:00 AM").await;
    let id = booking["id"].as_i64().unwrap();

    for _ in 0..2 {
        let (status, json) = send(
            &state,
            post_json(&format!("/api/bookings/{id}/cancel"), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "cancelled");
    }

    assert_eq!(slots(&state, appt_id, "2030-01-07").await, vec!["9:00 AM", "9:30 AM"]);

    let (status, _) = send(&state, post_json("/api/bookings/999/cancel", json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reschedule_appointment() {
    let state = test_state();
    let appt_id = create_appointment_type(&state).await;
    let (_, first) = book_slot(&state, appt_id, "2030-01-07", "9:00 AM").await;
    let (_, second) = book_slot(&state, appt_id, "2030-01-07", "9:30 AM").await;
    let first_id = first["id"].as_i64().unwrap();

    let (status, json) = send(&state, get(&format!("/api/bookings/{first_id}/reschedulable"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reschedulable"], true);
    assert_eq!(json["reschedule_hours"], 24);

    // Onto the other booking's slot.
    let (status, _) = send(
        &state,
        post_json(
            &format!("/api/bookings/{first_id}/reschedule"),
            json!({"date": "2030-01-07", "slot": second["event_time"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Keeping its own slot is allowed.
    let (status, _) = send(
        &state,
        post_json(
            &format!("/api/bookings/{first_id}/reschedule"),
            json!({"date": "2030-01-07", "slot": "9:00 AM"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(
        &state,
        post_json(
            &format!("/api/bookings/{first_id}/reschedule"),
            json!({"date": "2030-01-14", "slot": "9:30 AM"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], first_id);
    assert_eq!(json["event_date"], "2030-01-14");
    assert_eq!(json["event_time"], "09:30");

    assert_eq!(slots(&state, appt_id, "2030-01-07").await, vec!["9:00 AM"]);
}

#[tokio::test]
async fn test_reschedule_policy_and_force() {
    let state = test_state();
    let class_id = create_class(&state).await;
    let (_, booking) = book(
        &state,
        json!({"customer_id": 3, "service_type": "class", "service_id": class_id, "date": "2030-01-09"}),
    )
    .await;
    let id = booking["id"].as_i64().unwrap();

    let (_, json) = send(&state, get(&format!("/api/bookings/{id}/reschedulable"))).await;
    assert_eq!(json["reschedulable"], false);
    assert_eq!(json["allow_rescheduling"], false);

    let (status, json) = send(
        &state,
        post_json(&format!("/api/bookings/{id}/reschedule"), json!({"date": "2030-01-16"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("policy violation"));

    let (status, json) = send(
        &state,
        admin_post(
            &format!("/api/bookings/{id}/reschedule"),
            json!({"date": "2030-01-16", "force": true}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["event_date"], "2030-01-16");
    assert_eq!(json["status"], "confirmed");
}

#[tokio::test]
async fn test_force_reschedule_requires_auth() {
    let state = test_state();
    let class_id = create_class(&state).await;
    let (_, booking) = book(
        &state,
        json!({"customer_id": 3, "service_type": "class", "service_id": class_id, "date": "2030-01-09"}),
    )
    .await;
    let id = booking["id"].as_i64().unwrap();

    let (status, _) = send(
        &state,
        post_json(
            &format!("/api/bookings/{id}/reschedule"),
            json!({"date": "2030-01-16", "force": true}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, json) = send(&state, get("/api/bookings?customer_id=3")).await;
    let upcoming = json["upcoming"].as_array().unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0]["event_date"], "2030-01-09");
    assert_eq!(upcoming[0]["status"], "confirmed");
}

#[tokio::test]
async fn test_cancelled_booking_cannot_be_rescheduled() {
    let state = test_state();
    let appt_id = create_appointment_type(&state).await;
    let (_, booking) = book_slot(&state, appt_id, "2030-01-07", "9:00 AM").await;
    let id = booking["id"].as_i64().unwrap();

    let (status, _) = send(&state, post_json(&format!("/api/bookings/{id}/cancel"), json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(
        &state,
        post_json(
            &format!("/api/bookings/{id}/reschedule"),
            json!({"date": "2030-01-14", "slot": "9:00 AM"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("cancelled"));

    // An admin move does not revive it either.
    let (status, _) = send(
        &state,
        admin_post(
            &format!("/api/bookings/{id}/reschedule"),
            json!({"date": "2030-01-14", "slot": "9:00 AM", "force": true}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, json) = send(&state, get("/api/bookings?customer_id=1")).await;
    let all: Vec<&Value> = json["upcoming"]
        .as_array()
        .unwrap()
        .iter()
        .chain(json["past"].as_array().unwrap())
        .collect();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0]["status"], "cancelled");
    assert_eq!(all[0]["event_date"], "2030-01-07");
    assert_eq!(slots(&state, appt_id, "2030-01-14").await, vec!["9:00 AM", "9:30 AM"]);
}

#[tokio::test]
async fn test_session_booking_cannot_be_moved() {
    let state = test_state();
    let (status, session) = send(
        &state,
        admin_post(
            "/api/catalog/sessions",
            json!({
                "title": "Deep Dive Coaching Session",
                "date": "2030-01-08",
                "time": "10:00",
                "duration": 60,
                "allow_rescheduling": true
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let session_id = session["id"].as_i64().unwrap();

    let (status, booking) = book(
        &state,
        json!({"customer_id": 4, "service_type": "session", "service_id": session_id}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = booking["id"].as_i64().unwrap();

    let (status, json) = send(
        &state,
        post_json(&format!("/api/bookings/{id}/reschedule"), json!({"date": "2030-02-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("cannot be moved"));

    let (_, json) = send(&state, get("/api/bookings?customer_id=4")).await;
    assert_eq!(json["upcoming"][0]["event_date"], "2030-01-08");
    assert_eq!(json["upcoming"][0]["event_time"], "10:00");
}

#[tokio::test]
async fn test_customer_bookings() {
    let state = test_state();
    let appt_id = create_appointment_type(&state).await;
    book_slot(&state, appt_id, "2030-01-14", "9:00 AM").await;
    book_slot(&state, appt_id, "2030-01-07", "9:00 AM").await;

    let (status, json) = send(&state, get("/api/bookings?customer_id=1")).await;
    assert_eq!(status, StatusCode::OK);
    let upcoming = json["upcoming"].as_array().unwrap();
    assert_eq!(upcoming.len(), 2);
    assert_eq!(upcoming[0]["event_date"], "2030-01-07");
    assert_eq!(upcoming[1]["event_date"], "2030-01-14");
    assert!(json["past"].as_array().unwrap().is_empty());

    let (_, json) = send(&state, get("/api/bookings?customer_id=2")).await;
    assert!(json["upcoming"].as_array().unwrap().is_empty());
}

// ── Calendar ──

#[tokio::test]
async fn test_calendar_feed() {
    let state = test_state();
    let appt_id = create_appointment_type(&state).await;
    let class_id = create_class(&state).await;
    book_slot(&state, appt_id, "2030-01-07", "9:30 AM").await;

    let (status, json) = send(
        &state,
        admin_get("/api/calendar?start=2030-01-06&end=2030-01-12"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let events = json.as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["kind"], "booking");
    assert_eq!(events[0]["start"], "2030-01-07T09:30:00");
    assert_eq!(events[0]["end"], "2030-01-07T10:00:00");
    assert_eq!(events[1]["kind"], "class");
    assert_eq!(events[1]["id"], format!("c-{class_id}-2030-01-09"));

    let (_, json) = send(
        &state,
        admin_get("/api/calendar?start=2030-01-06&end=2030-01-12&only_booked=true"),
    )
    .await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (_, json) = send(
        &state,
        admin_get("/api/calendar?start=2030-01-06&end=2030-01-12&bookings=false"),
    )
    .await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["kind"], "class");
}

#[tokio::test]
async fn test_calendar_range_is_limited() {
    let state = test_state();
    let (status, _) = send(
        &state,
        admin_get("/api/calendar?start=2030-01-01&end=2030-12-31"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_ics() {
    let state = test_state();
    let appt_id = create_appointment_type(&state).await;
    let (_, booking) = book_slot(&state, appt_id, "2030-01-07", "9:00 AM").await;
    let id = booking["id"].as_i64().unwrap();

    let res = test_app(state.clone())
        .oneshot(get(&format!("/calendar/{id}.ics")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "text/calendar; charset=utf-8"
    );
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let ics = String::from_utf8(body.to_vec()).unwrap();
    assert!(ics.contains("DTSTART:20300107T090000Z"));
    assert!(ics.contains("DTEND:20300107T093000Z"));
    assert!(ics.contains("SUMMARY:30-Minute Check-in with Bright Path Coaching"));

    let (status, _) = send(&state, get("/calendar/999.ics")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
