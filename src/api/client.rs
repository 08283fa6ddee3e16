use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::ExchangeError;
use super::public::{ChatRequest, ChatResponse};

/// The operations a conversation session needs from the booking
/// assistant backend.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one user turn along with the prior history.
    async fn exchange(&self, request: &ChatRequest) -> Result<ChatResponse, ExchangeError>;

    /// Succeeds when the backend answers its liveness check with a 2xx.
    async fn health(&self) -> Result<(), ExchangeError>;

    /// Service metadata in whatever shape the backend provides.
    async fn describe(&self) -> Result<Value, ExchangeError>;
}

/// `ChatBackend` over HTTP with JSON bodies.
///
/// Endpoints are resolved relative to `base_url`:
/// - `POST /chat` exchanges a message
/// - `GET /health` is the liveness check
/// - `GET /` describes the service
#[derive(Clone, Debug)]
pub struct HttpBackend {
    base_url: String,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: None,
            client: reqwest::Client::new(),
        }
    }

    /// Fail any request that takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.get(self.url(path));
        match self.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json");
        match self.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn exchange(&self, request: &ChatRequest) -> Result<ChatResponse, ExchangeError> {
        tracing::debug!(
            "POST {}/chat with {} history entries",
            self.base_url,
            request.conversation_history.len()
        );

        let response = self
            .post("/chat")
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;

        Ok(response)
    }

    async fn health(&self) -> Result<(), ExchangeError> {
        self.get("/health").send().await?.error_for_status()?;
        Ok(())
    }

    async fn describe(&self) -> Result<Value, ExchangeError> {
        let info = self
            .get("/")
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::public::HistoryEntry;
    use crate::chat::models::Role;
    use mockito::Matcher;
    use reqwest::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn it_posts_the_message_and_history() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "message": "Two nights in Kyoto",
                "conversation_history": [
                    {"role": "user", "content": "Hi"},
                    {"role": "assistant", "content": "Hello! Where are you headed?"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response": "I found four ryokans.", "status": "success"}"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(&server.url());
        let request = ChatRequest {
            message: String::from("Two nights in Kyoto"),
            conversation_history: vec![
                HistoryEntry {
                    role: Role::User,
                    content: String::from("Hi"),
                },
                HistoryEntry {
                    role: Role::Assistant,
                    content: String::from("Hello! Where are you headed?"),
                },
            ],
        };
        let resp = backend.exchange(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(resp.response.as_deref(), Some("I found four ryokans."));
        assert!(resp.is_success());
    }

    #[tokio::test]
    async fn it_trims_the_trailing_slash_from_the_base_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/health")
            .with_status(200)
            .create_async()
            .await;

        let backend = HttpBackend::new(&format!("{}/", server.url()));
        assert!(backend.health().await.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn it_maps_error_statuses() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let backend = HttpBackend::new(&server.url());
        let request = ChatRequest {
            message: String::from("hello"),
            conversation_history: vec![],
        };
        let err = backend.exchange(&request).await.unwrap_err();

        assert!(matches!(err, ExchangeError::Status(StatusCode::SERVICE_UNAVAILABLE)));
    }

    #[tokio::test]
    async fn it_maps_undecodable_bodies() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let backend = HttpBackend::new(&server.url());
        let request = ChatRequest {
            message: String::from("hello"),
            conversation_history: vec![],
        };
        let err = backend.exchange(&request).await.unwrap_err();

        assert!(matches!(err, ExchangeError::Malformed(_)));
    }

    #[tokio::test]
    async fn it_maps_refused_connections() {
        // Nothing listens on port 1
        let backend = HttpBackend::new("http://127.0.0.1:1");
        let err = backend.health().await.unwrap_err();

        assert!(matches!(err, ExchangeError::Connect(_)));
    }

    #[tokio::test]
    async fn it_times_out_on_a_silent_backend() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and hold them open without answering
        tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });

        let backend = HttpBackend::new(&format!("http://{}", addr))
            .with_timeout(Duration::from_millis(200));
        let err = backend.health().await.unwrap_err();

        assert!(matches!(err, ExchangeError::Timeout(_)));
    }

    #[tokio::test]
    async fn it_describes_the_service() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "Hotel Booking Assistant", "version": "1.0.0"}"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(&server.url());
        let info = backend.describe().await.unwrap();

        assert_eq!(info["name"], "Hotel Booking Assistant");
        assert_eq!(info["version"], "1.0.0");
    }
}
