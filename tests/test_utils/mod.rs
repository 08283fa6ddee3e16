//! Test utilities for integration tests
use std::sync::Arc;
use std::time::Duration;

use concierge::api::HttpBackend;
use concierge::chat::{ConversationSession, SessionBuilder};

/// Creates a session talking to a mock backend at `url`.
pub fn test_session(url: &str) -> ConversationSession {
    let backend = HttpBackend::new(url).with_timeout(Duration::from_secs(5));
    SessionBuilder::new(Arc::new(backend)).build()
}

/// A successful reply body carrying `text`.
pub fn success_body(text: &str) -> String {
    serde_json::json!({"response": text, "status": "success"}).to_string()
}
