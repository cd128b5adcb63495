use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt; // for `oneshot`

use batepapo::{
    message::repository::InMemoryMessageRepository,
    participant::repository::InMemoryParticipantRepository, router, AppState,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// Full router backed by in-memory repositories the test can inspect
pub struct TestApp {
    pub router: Router,
    pub participants: Arc<InMemoryParticipantRepository>,
    pub messages: Arc<InMemoryMessageRepository>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body should be JSON")
    }
}

impl TestApp {
    pub fn new() -> Self {
        let participants = Arc::new(InMemoryParticipantRepository::new());
        let messages = Arc::new(InMemoryMessageRepository::new());
        let router = router(AppState::new(participants.clone(), messages.clone()));

        Self {
            router,
            participants,
            messages,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse { status, body }
    }

    pub async fn register(&self, name: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri("/participants")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::json!({ "name": name }).to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_message(&self, user: &str, body: serde_json::Value) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri("/messages")
            .header("content-type", "application/json")
            .header("user", user)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn get_messages(&self, user: &str, query: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(format!("/messages{}", query))
            .header("user", user)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn heartbeat(&self, user: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri("/status")
            .header("user", user)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }
}
