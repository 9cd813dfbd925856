//! HTTP transport for the remote learner service.
//!
//! Epistemic foundation:
//! - K_i: The learner exposes POST /submit_example and POST /reset
//! - B_i: The service will answer (might hang, fail, or send garbage)
//! - I^B: Network availability unknowable → classify, never retry

use crate::models::{Example, ServerResponse, TransportError};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

/// Outbound operations against the learner.
///
/// Each call issues exactly one request; there is no retry. The session
/// depends on this trait rather than on [`LearnerClient`] so drivers can
/// substitute their own transport.
pub trait LearnerTransport: Send + Sync {
    /// Send one labeled example.
    fn submit(
        &self,
        example: &Example,
    ) -> impl Future<Output = Result<ServerResponse, TransportError>> + Send;

    /// Ask the learner to return to its initial hypothesis.
    fn reset(&self) -> impl Future<Output = Result<ServerResponse, TransportError>> + Send;
}

/// reqwest-backed learner client.
#[derive(Debug, Clone)]
pub struct LearnerClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl LearnerClient {
    /// Create a new learner client.
    ///
    /// With `timeout` set to `None` a hung request waits indefinitely.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().default_headers(Self::headers());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(TransportError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a reqwest failure onto the transport taxonomy.
    fn classify(&self, url: &str, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout.unwrap_or_default())
        } else {
            TransportError::Unreachable {
                url: url.to_string(),
                source: err,
            }
        }
    }

    /// Turn a response into a decoded body, or a classified error.
    async fn decode(
        &self,
        url: &str,
        response: reqwest::Response,
    ) -> Result<ServerResponse, TransportError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(url, e))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<serde_json::Value>(&body)
            .map(ServerResponse)
            .map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn post(
        &self,
        path: &str,
        body: Option<&Example>,
    ) -> Result<ServerResponse, TransportError> {
        let start = Instant::now();
        let url = self.url(path);

        let mut request = self.client.post(&url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let result = match request.send().await {
            Ok(response) => self.decode(&url, response).await,
            Err(e) => Err(self.classify(&url, e)),
        };

        debug!(
            url = %url,
            ok = result.is_ok(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Learner request finished"
        );
        result
    }

    /// Health check: ping the service root.
    ///
    /// K_i: endpoint is reachable and responding
    /// B_i: endpoint is healthy if / returns 2xx
    pub async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let url = self.url("/");

        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
        {
            Ok(response) => {
                let latency_ms = start.elapsed().as_millis() as u64;
                let status = response.status();
                if status.is_success() {
                    HealthCheckResult {
                        url,
                        status: HealthStatus::Healthy,
                        latency_ms: Some(latency_ms),
                        message: response.text().await.ok().map(|s| s.trim().to_string()),
                    }
                } else {
                    HealthCheckResult {
                        url,
                        status: HealthStatus::Unhealthy,
                        latency_ms: Some(latency_ms),
                        message: Some(format!("HTTP {}", status.as_u16())),
                    }
                }
            }
            Err(e) => HealthCheckResult {
                url,
                status: HealthStatus::Unreachable,
                latency_ms: None,
                message: Some(e.to_string()),
            },
        }
    }
}

impl LearnerTransport for LearnerClient {
    async fn submit(&self, example: &Example) -> Result<ServerResponse, TransportError> {
        self.post("/submit_example", Some(example)).await
    }

    async fn reset(&self) -> Result<ServerResponse, TransportError> {
        self.post("/reset", None).await
    }
}

/// Health check result.
#[derive(Debug, Clone)]
pub struct HealthCheckResult {
    /// Probed URL
    pub url: String,
    /// Health status
    pub status: HealthStatus,
    /// Latency in milliseconds (if reachable)
    pub latency_ms: Option<u64>,
    /// Banner on success, error description otherwise
    pub message: Option<String>,
}

/// Health status of the learner service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Service is responding normally
    Healthy,
    /// Service is responding but with errors
    Unhealthy,
    /// Service is not reachable
    Unreachable,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
            HealthStatus::Unreachable => write!(f, "unreachable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_submit_posts_example_and_decodes() {
        let router = Router::new().route(
            "/submit_example",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body, json!({"example": "1,0,1,0,1", "label": "+"}));
                Json(json!({
                    "current_hypothesis": ["x1", "x3", "x5"],
                    "log": ["added x1", "added x3", "added x5"]
                }))
            }),
        );
        let base = serve(router).await;
        let client = LearnerClient::new(format!("{base}/"), None).unwrap();
        assert_eq!(client.base_url(), base);

        let example = Example::new("1,0,1,0,1", "+").unwrap();
        let response = client.submit(&example).await.unwrap();
        assert_eq!(
            response.as_value()["current_hypothesis"],
            json!(["x1", "x3", "x5"])
        );
    }

    #[tokio::test]
    async fn test_reset_issues_single_request() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let router = Router::new().route(
            "/reset",
            post(move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"status": "reset", "current_hypothesis": [], "log": []}))
                }
            }),
        );
        let base = serve(router).await;
        let client = LearnerClient::new(base, None).unwrap();

        client.reset().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_success_status_is_classified() {
        let router = Router::new().route(
            "/reset",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = serve(router).await;
        let client = LearnerClient::new(base, None).unwrap();

        match client.reset().await {
            Err(TransportError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_body_is_classified() {
        let router = Router::new().route("/reset", post(|| async { "<html>oops</html>" }));
        let base = serve(router).await;
        let client = LearnerClient::new(base, None).unwrap();

        assert!(matches!(
            client.reset().await,
            Err(TransportError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_classified() {
        let router = Router::new().route(
            "/reset",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({}))
            }),
        );
        let base = serve(router).await;
        let client = LearnerClient::new(base, Some(Duration::from_millis(100))).unwrap();

        match client.reset().await {
            Err(TransportError::Timeout(d)) => assert_eq!(d, Duration::from_millis(100)),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_is_classified() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = LearnerClient::new(format!("http://{addr}"), None).unwrap();
        assert!(matches!(
            client.reset().await,
            Err(TransportError::Unreachable { .. })
        ));

        let health = client.health_check().await;
        assert_eq!(health.status, HealthStatus::Unreachable);
    }

    #[tokio::test]
    async fn test_health_check_reads_banner() {
        let router = Router::new().route("/", get(|| async { "Learner API is running!" }));
        let base = serve(router).await;
        let client = LearnerClient::new(base, None).unwrap();

        let health = client.health_check().await;
        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.message.as_deref(), Some("Learner API is running!"));
        assert!(health.latency_ms.is_some());
    }
}
