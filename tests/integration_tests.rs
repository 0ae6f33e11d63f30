use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use slotbook::config::AppConfig;
use slotbook::handlers;
use slotbook::services::notifications::{NotificationDispatcher, Notifier};
use slotbook::state::AppState;
use slotbook::storage::{DocumentStore, JsonFileMedium, MemoryMedium};

// ── Mock Notifier ──

type Outbox = Arc<Mutex<Vec<(String, String)>>>;

struct MockNotifier {
    sent: Outbox,
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

struct BrokenNotifier;

#[async_trait]
impl Notifier for BrokenNotifier {
    async fn send(&self, _to: &str, _subject: &str, _html_body: &str) -> anyhow::Result<()> {
        anyhow::bail!("connection refused")
    }
}

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        data_file: ":memory:".to_string(),
        public_dir: "public".into(),
        public_url: "https://pz.example".to_string(),
        admin_token: "test-token".to_string(),
        mail_api_url: "".to_string(),
        mail_api_key: "".to_string(),
        mail_from: "bookings@pz.example".to_string(),
        receiver_email: "owner@pz.example".to_string(),
        send_confirmations: false,
        storage_timeout_ms: 500,
        notify_timeout_secs: 1,
    }
}

fn state_with(config: AppConfig, store: DocumentStore, notifier: Arc<dyn Notifier>) -> Arc<AppState> {
    Arc::new(AppState {
        config,
        store,
        notifications: NotificationDispatcher::spawn(notifier, Duration::from_secs(1)),
    })
}

fn memory_store(medium: &MemoryMedium) -> DocumentStore {
    DocumentStore::new(Box::new(medium.clone()), Duration::from_millis(500))
}

fn test_state() -> Arc<AppState> {
    state_with(
        test_config(),
        memory_store(&MemoryMedium::new()),
        Arc::new(BrokenNotifier),
    )
}

fn test_state_with_sent(config: AppConfig) -> (Arc<AppState>, Outbox) {
    let sent = Arc::new(Mutex::new(vec![]));
    let notifier = MockNotifier {
        sent: Arc::clone(&sent),
    };
    let state = state_with(config, memory_store(&MemoryMedium::new()), Arc::new(notifier));
    (state, sent)
}

fn test_app(state: Arc<AppState>) -> Router {
    handlers::api_router(state)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(state: &Arc<AppState>, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = test_app(state.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn wait_for_outbox(sent: &Outbox, count: usize) -> Vec<(String, String)> {
    for _ in 0..100 {
        if sent.lock().unwrap().len() >= count {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    sent.lock().unwrap().clone()
}

const JANE: &str = r#"{"name":"Jane Doe","email":"jane@x.com","date":"2024-06-01","time":"10:00"}"#;
const JOHN: &str = r#"{"name":"John","email":"john@x.com","date":"2024-06-01","time":"10:00"}"#;

// ── Booking API Tests ──

#[tokio::test]
async fn test_health() {
    let state = test_state();
    let (status, json) = send(&state, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_booking_conflict_cancel_rebook_flow() {
    let state = test_state();

    let (status, json) = send(&state, post_json("/api/book", JANE)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Booking successful");
    assert!(json["bookingId"].is_i64());
    let jane_token = json["cancelToken"].as_str().unwrap().to_string();

    let (status, json) = send(&state, post_json("/api/book", JOHN)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "This slot has just been booked by someone else.");

    let (status, json) = send(
        &state,
        post_json("/api/cancel-booking", &format!(r#"{{"token":"{jane_token}"}}"#)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Appointment cancelled successfully");

    let (status, _) = send(&state, post_json("/api/book", JOHN)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_fields_is_bad_request() {
    let state = test_state();

    let (status, json) = send(
        &state,
        post_json("/api/book", r#"{"name":"Jane","email":"jane@x.com","date":"2024-06-01"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("time"));

    let (_, slots) = send(&state, get("/api/booked-slots")).await;
    assert_eq!(slots.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_booked_slots_excludes_cancelled() {
    let state = test_state();

    let (_, jane) = send(&state, post_json("/api/book", JANE)).await;
    send(
        &state,
        post_json(
            "/api/book",
            r#"{"name":"Ann","email":"ann@x.com","date":"2024-06-01","time":"11:00"}"#,
        ),
    )
    .await;

    let id = jane["bookingId"].as_i64().unwrap();
    let (status, _) = send(
        &state,
        post_json("/api/cancel-booking", &format!(r#"{{"id":{id}}}"#)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, slots) = send(&state, get("/api/booked-slots")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        slots,
        serde_json::json!([{ "date": "2024-06-01", "time": "11:00" }])
    );
}

#[tokio::test]
async fn test_cancel_unknown_id_is_not_found() {
    let state = test_state();

    let (status, json) = send(
        &state,
        post_json("/api/cancel-booking", r#"{"id":"999999999999"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Appointment not found");
}

#[tokio::test]
async fn test_cancel_twice_succeeds() {
    let state = test_state();

    let (_, jane) = send(&state, post_json("/api/book", JANE)).await;
    let body = format!(r#"{{"token":"{}"}}"#, jane["cancelToken"].as_str().unwrap());

    let (first, _) = send(&state, post_json("/api/cancel-booking", &body)).await;
    let (second, _) = send(&state, post_json("/api/cancel-booking", &body)).await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
}

#[tokio::test]
async fn test_cancel_without_identifier_is_bad_request() {
    let state = test_state();
    let (status, _) = send(&state, post_json("/api/cancel-booking", "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Admin API Tests ──

#[tokio::test]
async fn test_admin_requires_auth() {
    let state = test_state();

    let (status, _) = send(&state, get("/api/admin/bookings")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/api/admin/bookings")
        .header("Authorization", "Bearer wrong-token")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&state, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_lists_all_statuses() {
    let state = test_state();

    let (_, jane) = send(&state, post_json("/api/book", JANE)).await;
    let body = format!(r#"{{"token":"{}"}}"#, jane["cancelToken"].as_str().unwrap());
    send(&state, post_json("/api/cancel-booking", &body)).await;
    send(&state, post_json("/api/book", JOHN)).await;

    let req = Request::builder()
        .uri("/api/admin/bookings")
        .header("Authorization", "Bearer test-token")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(&state, req).await;
    assert_eq!(status, StatusCode::OK);

    let bookings = json.as_array().unwrap();
    assert_eq!(bookings.len(), 2);
    assert_eq!(bookings[0]["name"], "Jane Doe");
    assert_eq!(bookings[0]["status"], "cancelled");
    assert_eq!(bookings[1]["name"], "John");
    assert_eq!(bookings[1]["status"], "confirmed");
    assert!(bookings[1]["cancelToken"].is_string());
}

// ── Notifications ──

#[tokio::test]
async fn test_booking_notifies_operator_and_requester() {
    let mut config = test_config();
    config.send_confirmations = true;
    let (state, sent) = test_state_with_sent(config);

    let (status, _) = send(&state, post_json("/api/book", JANE)).await;
    assert_eq!(status, StatusCode::OK);

    let sent = wait_for_outbox(&sent, 2).await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0, "owner@pz.example");
    assert_eq!(sent[0].1, "New Appointment: Jane Doe");
    assert_eq!(sent[1].0, "jane@x.com");
}

#[tokio::test]
async fn test_cancel_notifies_operator() {
    let (state, sent) = test_state_with_sent(test_config());

    let (_, jane) = send(&state, post_json("/api/book", JANE)).await;
    let body = format!(r#"{{"token":"{}"}}"#, jane["cancelToken"].as_str().unwrap());
    send(&state, post_json("/api/cancel-booking", &body)).await;

    let sent = wait_for_outbox(&sent, 2).await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].1, "Appointment Cancelled: Jane Doe");
}

#[tokio::test]
async fn test_broken_notifier_does_not_fail_booking() {
    let state = test_state();
    let (status, json) = send(&state, post_json("/api/book", JANE)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["cancelToken"].is_string());
}

// ── Contact / Subscribe ──

#[tokio::test]
async fn test_contact_and_subscribe() {
    let (state, sent) = test_state_with_sent(test_config());

    let (status, json) = send(
        &state,
        post_json(
            "/api/contact",
            r#"{"firstName":"Ann","lastName":"Lee","email":"ann@x.com","message":"Hi"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Sent");

    let (status, _) = send(&state, post_json("/api/contact", r#"{"lastName":"Lee"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for _ in 0..2 {
        let (status, json) = send(&state, post_json("/api/subscribe", r#"{"email":"fan@x.com"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Done");
    }
    let (status, _) = send(&state, post_json("/api/subscribe", r#"{}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let doc = state.store.read().await;
    assert_eq!(doc.contacts.len(), 1);
    assert_eq!(doc.subscribers, vec!["fan@x.com".to_string()]);

    let sent = wait_for_outbox(&sent, 1).await;
    assert_eq!(sent[0].1, "New Inquiry: Ann Lee");
}

// ── Persistence ──

#[tokio::test]
async fn test_bookings_survive_restart_with_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");

    let file_store = || DocumentStore::new(Box::new(JsonFileMedium::new(&path)), Duration::from_secs(1));

    let state = state_with(test_config(), file_store(), Arc::new(BrokenNotifier));
    let (status, _) = send(&state, post_json("/api/book", JANE)).await;
    assert_eq!(status, StatusCode::OK);

    let on_disk: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(on_disk["bookings"][0]["name"], "Jane Doe");
    assert!(on_disk["bookings"][0]["cancelToken"].is_string());

    // Fresh process: empty cache, same file
    let restarted = state_with(test_config(), file_store(), Arc::new(BrokenNotifier));
    let (status, _) = send(&restarted, post_json("/api/book", JOHN)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unreadable_medium_serves_cached_slots() {
    let medium = MemoryMedium::new();
    let state = state_with(test_config(), memory_store(&medium), Arc::new(BrokenNotifier));

    send(&state, post_json("/api/book", JANE)).await;
    medium.set_failing(true);

    let (status, slots) = send(&state, get("/api/booked-slots")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slots.as_array().unwrap().len(), 1);

    // Clash check still sees the cached booking
    let (status, _) = send(&state, post_json("/api/book", JOHN)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_storage_timeout_is_internal_error() {
    let medium = MemoryMedium::new();
    let store = DocumentStore::new(Box::new(medium.clone()), Duration::from_millis(20));
    let state = state_with(test_config(), store, Arc::new(BrokenNotifier));
    medium.set_latency(Duration::from_millis(200));

    let (status, json) = send(&state, post_json("/api/book", JANE)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Internal Server Error");
}

#[tokio::test]
async fn test_timed_out_booking_leaves_slot_free() {
    let medium = MemoryMedium::new();
    let store = DocumentStore::new(Box::new(medium.clone()), Duration::from_millis(20));
    let state = state_with(test_config(), store, Arc::new(BrokenNotifier));
    medium.set_latency(Duration::from_millis(100));

    let (status, _) = send(&state, post_json("/api/book", JANE)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    medium.set_latency(Duration::ZERO);
    let (_, slots) = send(&state, get("/api/booked-slots")).await;
    assert_eq!(slots.as_array().unwrap().len(), 0);

    let (status, json) = send(&state, post_json("/api/book", JANE)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["cancelToken"].is_string());
}

// ── Malformed Bodies ──

#[tokio::test]
async fn test_null_field_is_invalid_input() {
    let state = test_state();

    let (status, json) = send(
        &state,
        post_json(
            "/api/book",
            r#"{"name":null,"email":"jane@x.com","date":"2024-06-01","time":"10:00"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    let (_, slots) = send(&state, get("/api/booked-slots")).await;
    assert_eq!(slots.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_bad_id_type_is_invalid_input() {
    let state = test_state();

    let (status, json) = send(&state, post_json("/api/cancel-booking", r#"{"id":1.5}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_unparseable_bodies_are_invalid_input() {
    let state = test_state();

    let (status, json) = send(&state, post_json("/api/book", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    let (status, _) = send(&state, post_json("/api/subscribe", r#"{"email":42}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&state, post_json("/api/contact", r#"["Ann"]"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
