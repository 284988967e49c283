//! Test server lifecycle management
//!
//! Spawns an in-memory CRM backend serving the notification endpoints. Each
//! test gets an isolated server seeded with the fixture notifications, plus
//! switches to make endpoints fail or respond slowly.

use super::constants::*;
use super::fixtures::seed_notifications;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use crm_notification_feed::Notification;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::net::TcpListener;

/// Backend state shared between the handlers and the test.
#[derive(Default)]
pub struct Backend {
    notifications: Mutex<Vec<Notification>>,
    fail_list: AtomicBool,
    fail_mutations: AtomicBool,
    list_delay_ms: AtomicU64,
    list_requests: AtomicUsize,
    count_requests: AtomicUsize,
}

impl Backend {
    fn notifications(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn unread(&self) -> u64 {
        self.notifications().iter().filter(|n| !n.is_read).count() as u64
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    offset: usize,
    #[serde(default)]
    unread_only: bool,
}

fn default_limit() -> usize {
    PAGE_SIZE
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TEST_TOKEN))
        .unwrap_or(false)
}

async fn list_notifications(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    backend.list_requests.fetch_add(1, Ordering::SeqCst);

    let delay = backend.list_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    if backend.fail_list.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let notifications = backend.notifications();
    let matching: Vec<&Notification> = notifications
        .iter()
        .filter(|n| !params.unread_only || !n.is_read)
        .collect();
    let page: Vec<&Notification> = matching
        .iter()
        .skip(params.offset)
        .take(params.limit)
        .copied()
        .collect();

    Json(json!({
        "data": {
            "notifications": page,
            "total": matching.len(),
        }
    }))
    .into_response()
}

async fn unread_count(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    backend.count_requests.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "data": { "count": backend.unread() } })).into_response()
}

async fn mark_read(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if backend.fail_mutations.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let mut notifications = backend.notifications();
    match notifications.iter_mut().find(|n| n.id == id) {
        Some(n) => {
            n.is_read = true;
            Json(json!({ "success": true })).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Notification not found" })),
        )
            .into_response(),
    }
}

async fn mark_all_read(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if backend.fail_mutations.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    for n in backend.notifications().iter_mut() {
        n.is_read = true;
    }
    Json(json!({ "success": true, "message": "All notifications marked as read" }))
        .into_response()
}

fn make_app(backend: Arc<Backend>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/notifications", get(list_notifications))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/mark-all-read", put(mark_all_read))
        .route("/notifications/{id}/read", put(mark_read))
        .with_state(backend)
}

/// Test server instance with its own seeded backend
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    #[allow(dead_code)]
    pub port: u16,

    backend: Arc<Backend>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

#[allow(dead_code)]
impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if port binding fails or the server doesn't become ready
    /// within timeout.
    pub async fn spawn() -> Self {
        let backend = Arc::new(Backend {
            notifications: Mutex::new(seed_notifications()),
            ..Default::default()
        });

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let app = make_app(backend.clone());

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            backend,
            _shutdown_tx: Some(shutdown_tx),
        };
        server.wait_for_ready().await;
        server
    }

    /// Waits for the server to become ready by polling /health
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/health", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }

    /// Make `GET /notifications` answer 500.
    pub fn fail_list(&self, fail: bool) {
        self.backend.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Make both read mutations answer 500.
    pub fn fail_mutations(&self, fail: bool) {
        self.backend.fail_mutations.store(fail, Ordering::SeqCst);
    }

    /// Delay every subsequent `GET /notifications` response.
    pub fn set_list_delay(&self, delay: Duration) {
        self.backend
            .list_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn list_requests(&self) -> usize {
        self.backend.list_requests.load(Ordering::SeqCst)
    }

    pub fn count_requests(&self) -> usize {
        self.backend.count_requests.load(Ordering::SeqCst)
    }

    pub fn unread_count(&self) -> u64 {
        self.backend.unread()
    }

    pub fn is_read(&self, id: &str) -> Option<bool> {
        self.backend
            .notifications()
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.is_read)
    }

    /// Mark a notification read behind the client's back, as another
    /// session would.
    pub fn mark_read_elsewhere(&self, id: &str) {
        if let Some(n) = self.backend.notifications().iter_mut().find(|n| n.id == id) {
            n.is_read = true;
        }
    }

    /// Insert a new notification at the top of the list.
    pub fn push_front(&self, notification: Notification) {
        self.backend.notifications().insert(0, notification);
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
