//! HTTP Transport
//!
//! HTTP client interface and implementations used by both the plain and the
//! intercepted request pipelines.

use async_trait::async_trait;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ApiError, ApiResult, ConfigurationError, NetworkError, ProtocolError};

/// Default response size cap (1 MiB).
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 1_048_576;

/// HTTP request definition.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request URL.
    pub url: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<String>,
    /// Request timeout.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Bearer token carried in the `authorization` header, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get("authorization")
            .and_then(|value| value.strip_prefix("Bearer "))
    }
}

/// HTTP method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// HTTP response definition.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Status text.
    pub status_text: String,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: String,
}

impl HttpResponse {
    /// Build a JSON response.
    pub fn json<T: serde::Serialize>(status: u16, body: &T) -> Self {
        Self {
            status,
            status_text: if (200..300).contains(&status) { "OK" } else { "Error" }.to_string(),
            headers: [("content-type".to_string(), "application/json".to_string())]
                .into_iter()
                .collect(),
            body: serde_json::to_string(body).unwrap_or_default(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn parse_json<T: serde::de::DeserializeOwned>(&self) -> ApiResult<T> {
        let body = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(body).map_err(|e| {
            ApiError::Protocol(ProtocolError::InvalidJson {
                message: e.to_string(),
            })
        })
    }
}

/// HTTP transport interface (for dependency injection).
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request.
    async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        (**self).send(request).await
    }
}

/// Default reqwest-based HTTP transport.
pub struct ReqwestHttpTransport {
    client: reqwest::Client,
    default_timeout: Duration,
    max_response_size: usize,
}

impl ReqwestHttpTransport {
    /// Create new transport with default settings.
    pub fn new() -> ApiResult<Self> {
        Self::with_options(Duration::from_secs(30), DEFAULT_MAX_RESPONSE_SIZE)
    }

    /// Create transport with custom options.
    pub fn with_options(timeout: Duration, max_response_size: usize) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                ApiError::Configuration(ConfigurationError::InvalidConfig {
                    message: format!("failed to create HTTP client: {}", e),
                })
            })?;

        Ok(Self {
            client,
            default_timeout: timeout,
            max_response_size,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestHttpTransport {
    async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
            HttpMethod::Patch => self.client.patch(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        };

        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        req_builder = req_builder.timeout(timeout);

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Network(NetworkError::Timeout { timeout })
            } else {
                ApiError::Network(NetworkError::ConnectionFailed {
                    message: e.to_string(),
                })
            }
        })?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("")
            .to_string();

        if (300..400).contains(&status) {
            let location = response
                .headers()
                .get("location")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            return Err(ApiError::Protocol(ProtocolError::UnexpectedRedirect {
                location,
            }));
        }

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string().to_lowercase(), v.to_string());
            }
        }

        if let Some(len) = response.content_length() {
            if len as usize > self.max_response_size {
                return Err(ApiError::Protocol(ProtocolError::ResponseTooLarge {
                    size: len as usize,
                }));
            }
        }

        let body = response.text().await.map_err(|e| {
            ApiError::Protocol(ProtocolError::InvalidResponse {
                message: e.to_string(),
            })
        })?;

        if body.len() > self.max_response_size {
            return Err(ApiError::Protocol(ProtocolError::ResponseTooLarge {
                size: body.len(),
            }));
        }

        Ok(HttpResponse {
            status,
            status_text,
            headers,
            body,
        })
    }
}

/// Request-dependent responder for [`MockHttpTransport`].
pub type MockHandler =
    Arc<dyn Fn(HttpRequest) -> BoxFuture<'static, ApiResult<HttpResponse>> + Send + Sync>;

/// Mock HTTP transport for testing.
///
/// Answers from the handler when one is set, otherwise from the FIFO queue,
/// otherwise with the default response.
#[derive(Default)]
pub struct MockHttpTransport {
    responses: Mutex<VecDeque<ApiResult<HttpResponse>>>,
    request_history: Mutex<Vec<HttpRequest>>,
    default_response: Mutex<Option<HttpResponse>>,
    handler: Mutex<Option<MockHandler>>,
}

impl MockHttpTransport {
    /// Create new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response to return.
    pub fn queue_response(&self, response: HttpResponse) -> &Self {
        self.responses.lock().push_back(Ok(response));
        self
    }

    /// Queue a JSON response.
    pub fn queue_json_response<T: serde::Serialize>(&self, status: u16, body: &T) -> &Self {
        self.queue_response(HttpResponse::json(status, body))
    }

    /// Queue a transport-level failure.
    pub fn queue_error(&self, error: ApiError) -> &Self {
        self.responses.lock().push_back(Err(error));
        self
    }

    /// Set default response when queue is empty.
    pub fn set_default_response(&self, response: HttpResponse) -> &Self {
        *self.default_response.lock() = Some(response);
        self
    }

    /// Answer every request with `handler`, ignoring the queue.
    pub fn set_handler<F, Fut>(&self, respond: F) -> &Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ApiResult<HttpResponse>> + Send + 'static,
    {
        let handler: MockHandler = Arc::new(
            move |request: HttpRequest| -> BoxFuture<'static, ApiResult<HttpResponse>> {
                Box::pin(respond(request))
            },
        );
        *self.handler.lock() = Some(handler);
        self
    }

    /// Get request history.
    pub fn get_requests(&self) -> Vec<HttpRequest> {
        self.request_history.lock().clone()
    }

    /// Get last request.
    pub fn get_last_request(&self) -> Option<HttpRequest> {
        self.request_history.lock().last().cloned()
    }

    /// Number of requests whose URL ends with `path`.
    pub fn count_requests_to(&self, path: &str) -> usize {
        self.request_history
            .lock()
            .iter()
            .filter(|r| r.url.ends_with(path))
            .count()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        self.request_history.lock().push(request.clone());

        let handler = self.handler.lock().clone();
        if let Some(handler) = handler {
            return handler(request).await;
        }

        let queued = self.responses.lock().pop_front();
        if let Some(response) = queued {
            return response;
        }

        self.default_response.lock().clone().ok_or_else(|| {
            ApiError::Network(NetworkError::ConnectionFailed {
                message: "No mock response available".to_string(),
            })
        })
    }
}

/// Create production HTTP transport.
pub fn create_transport(timeout: Option<Duration>) -> ApiResult<ReqwestHttpTransport> {
    match timeout {
        Some(t) => ReqwestHttpTransport::with_options(t, DEFAULT_MAX_RESPONSE_SIZE),
        None => ReqwestHttpTransport::new(),
    }
}

/// Create mock HTTP transport for testing.
pub fn create_mock_transport() -> MockHttpTransport {
    MockHttpTransport::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    #[tokio::test]
    async fn test_mock_transport_queue_is_fifo() {
        let transport = MockHttpTransport::new();
        transport
            .queue_json_response(401, &serde_json::json!({"message": "expired"}))
            .queue_json_response(200, &serde_json::json!({"key": "value"}));

        let first = transport.send(get("https://example.com/a")).await.unwrap();
        let second = transport.send(get("https://example.com/b")).await.unwrap();
        assert_eq!(first.status, 401);
        assert_eq!(second.status, 200);
        assert!(second.body.contains("value"));

        let history = transport.get_requests();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].url, "https://example.com/a");
    }

    #[tokio::test]
    async fn test_mock_transport_handler_sees_request() {
        let transport = MockHttpTransport::new();
        transport.set_handler(|request: HttpRequest| async move {
            let status = if request.bearer_token() == Some("good") { 200 } else { 401 };
            Ok(HttpResponse::json(status, &serde_json::json!({})))
        });

        let mut request = get("https://example.com/me");
        assert_eq!(transport.send(request.clone()).await.unwrap().status, 401);

        request
            .headers
            .insert("authorization".to_string(), "Bearer good".to_string());
        assert_eq!(transport.send(request).await.unwrap().status, 200);
        assert_eq!(transport.count_requests_to("/me"), 2);
    }

    #[tokio::test]
    async fn test_mock_transport_empty_is_network_error() {
        let transport = create_mock_transport();
        let result = transport.send(get("https://example.com")).await;
        assert!(matches!(result, Err(ApiError::Network(_))));
    }

    #[tokio::test]
    async fn test_mock_transport_default_response_after_queue() {
        let transport = create_mock_transport();
        transport
            .queue_json_response(401, &serde_json::json!({}))
            .set_default_response(HttpResponse::json(200, &serde_json::json!({"ok": true})));

        assert_eq!(transport.send(get("https://example.com/a")).await.unwrap().status, 401);
        assert_eq!(transport.send(get("https://example.com/a")).await.unwrap().status, 200);
        assert_eq!(transport.send(get("https://example.com/a")).await.unwrap().status, 200);
    }

    #[test]
    fn test_create_transport() {
        assert!(create_transport(None).is_ok());
        assert!(create_transport(Some(Duration::from_secs(5))).is_ok());
    }

    #[test]
    fn test_http_method_as_str() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
        assert_eq!(HttpMethod::Put.as_str(), "PUT");
        assert_eq!(HttpMethod::Patch.as_str(), "PATCH");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }

    #[test]
    fn test_parse_json_empty_body_is_null() {
        let response = HttpResponse {
            status: 204,
            status_text: "No Content".to_string(),
            headers: HashMap::new(),
            body: String::new(),
        };
        let value: serde_json::Value = response.parse_json().unwrap();
        assert!(value.is_null());
        assert!(response.is_success());
    }
}
