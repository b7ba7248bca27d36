use crate::builder::HttpClientBuilder;
use crate::config::TransportSecurity;
use crate::error::HttpError;
use crate::request::RequestBuilder;
use crate::resources::ResourcesClient;
use crate::response::ResponseBody;
use bytes::Bytes;
use http::header::HeaderValue;
use http::{Method, Request, Response};
use http_body_util::Full;
use modkit_resources::ResourcesConfig;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tower::Service;
use tower::buffer::Buffer;

/// Future type of the inner service
pub type ServiceFuture =
    Pin<Box<dyn Future<Output = Result<Response<ResponseBody>, HttpError>> + Send>>;

/// `Buffer<Req, F>` in tower 0.5, where `Req` is the request type and `F` the service future
pub type BufferedService = Buffer<Request<Full<Bytes>>, ServiceFuture>;

/// HTTP client with tower middleware stack
///
/// `HttpClient` is `Clone + Send + Sync`; cloning only clones the buffer
/// channel, so store it directly without a `Mutex`.
///
/// Plain requests take an absolute URL:
///
/// ```ignore
/// let data: MyData = client
///     .get("https://example.com/api")
///     .send()
///     .await?
///     .json()
///     .await?;
/// ```
///
/// Typed resource requests go through [`resources()`](HttpClient::resources),
/// available when the client was built with
/// [`HttpClientBuilder::with_resources`].
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) service: BufferedService,
    pub(crate) max_body_size: usize,
    pub(crate) transport_security: TransportSecurity,
    pub(crate) user_agent: HeaderValue,
    pub(crate) resources: Option<Arc<ResourcesConfig>>,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    ///
    /// # Errors
    /// Returns an error if TLS initialization fails
    pub fn new() -> Result<Self, HttpError> {
        HttpClientBuilder::new().build()
    }

    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Create a request builder for an arbitrary method
    ///
    /// The URL must be absolute (scheme and host). Relative URLs are rejected
    /// by `send()` with [`HttpError::InvalidUri`].
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        RequestBuilder::new(
            self.service.clone(),
            self.max_body_size,
            method,
            url.to_owned(),
            self.user_agent.clone(),
            self.transport_security,
        )
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    pub fn put(&self, url: &str) -> RequestBuilder {
        self.request(Method::PUT, url)
    }

    pub fn patch(&self, url: &str) -> RequestBuilder {
        self.request(Method::PATCH, url)
    }

    pub fn delete(&self, url: &str) -> RequestBuilder {
        self.request(Method::DELETE, url)
    }

    pub fn head(&self, url: &str) -> RequestBuilder {
        self.request(Method::HEAD, url)
    }

    pub fn options(&self, url: &str) -> RequestBuilder {
        self.request(Method::OPTIONS, url)
    }

    /// Typed resource requests sharing this client's middleware stack.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::FeatureNotInstalled`] with `"resources"` if the
    /// client was built without [`HttpClientBuilder::with_resources`].
    pub fn resources(&self) -> Result<ResourcesClient, HttpError> {
        let Some(config) = self.resources.clone() else {
            return Err(HttpError::FeatureNotInstalled("resources"));
        };
        Ok(ResourcesClient::new(self.clone(), config))
    }

    /// Whether the resources feature is installed
    #[must_use]
    pub fn has_resources(&self) -> bool {
        self.resources.is_some()
    }
}

/// Map buffer errors to `HttpError`
///
/// Buffer returns either the inner service error or a closed-channel error
/// once its worker has shut down.
pub fn map_buffer_error(err: tower::BoxError) -> HttpError {
    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(err) => {
            tracing::error!(
                error = %err,
                "buffer worker closed unexpectedly; service unavailable"
            );
            HttpError::ServiceClosed
        }
    }
}

/// Reserve a buffer slot without waiting.
///
/// Returns `HttpError::Overloaded` right away if the buffer is full.
pub async fn try_acquire_buffer_slot(service: &mut BufferedService) -> Result<(), HttpError> {
    use std::task::Poll;

    let poll_result = std::future::poll_fn(|cx| match service.poll_ready(cx) {
        Poll::Ready(result) => Poll::Ready(Some(result)),
        Poll::Pending => Poll::Ready(None),
    })
    .await;

    match poll_result {
        Some(Ok(())) => Ok(()),
        Some(Err(e)) => Err(map_buffer_error(e)),
        None => Err(HttpError::Overloaded),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn test_client() -> HttpClient {
        HttpClientBuilder::new()
            .allow_insecure_http()
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_http_client_get() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/test");
            then.status(200).json_body(json!({"success": true}));
        });

        let client = test_client();
        let resp = client.get(&server.url("/test")).send().await.unwrap();

        assert_eq!(resp.status(), http::StatusCode::OK);
        assert!(resp.url_template().is_none());
    }

    #[tokio::test]
    async fn test_every_verb_uses_its_method() {
        let server = MockServer::start();
        let put = server.mock(|when, then| {
            when.method(PUT).path("/verb");
            then.status(204);
        });
        let patch = server.mock(|when, then| {
            when.method(PATCH).path("/verb");
            then.status(204);
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/verb");
            then.status(204);
        });
        let head = server.mock(|when, then| {
            when.method(httpmock::Method::HEAD).path("/verb");
            then.status(204);
        });
        let options = server.mock(|when, then| {
            when.method(OPTIONS).path("/verb");
            then.status(204);
        });

        let client = test_client();
        let url = server.url("/verb");
        for builder in [
            client.put(&url),
            client.patch(&url),
            client.delete(&url),
            client.head(&url),
            client.options(&url),
        ] {
            let resp = builder.send().await.unwrap();
            assert_eq!(resp.status(), http::StatusCode::NO_CONTENT);
        }

        put.assert();
        patch.assert();
        delete.assert();
        head.assert();
        options.assert();
    }

    #[tokio::test]
    async fn test_http_client_post_form() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(POST)
                .path("/submit")
                .header("content-type", "application/x-www-form-urlencoded")
                .body("key1=value1&key2=value2");
            then.status(200);
        });

        let resp = test_client()
            .post(&server.url("/submit"))
            .form(&[("key1", "value1"), ("key2", "value2")])
            .unwrap()
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_json_body_parsing() {
        #[derive(serde::Deserialize)]
        struct TestResponse {
            name: String,
            value: i32,
        }

        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/json");
            then.status(200).json_body(json!({"name": "test", "value": 42}));
        });

        let data: TestResponse = test_client()
            .get(&server.url("/json"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(data.name, "test");
        assert_eq!(data.value, 42);
    }

    #[tokio::test]
    async fn test_body_size_limit() {
        let server = MockServer::start();
        let large_body = "x".repeat(64 * 1024);
        let _m = server.mock(|when, then| {
            when.method(GET).path("/large");
            then.status(200).body(&large_body);
        });

        let client = HttpClientBuilder::new()
            .allow_insecure_http()
            .max_body_size(1024)
            .build()
            .unwrap();

        let result = client
            .get(&server.url("/large"))
            .send()
            .await
            .unwrap()
            .bytes()
            .await;
        assert!(matches!(
            result,
            Err(HttpError::BodyTooLarge { limit: 1024, .. })
        ));
    }

    #[tokio::test]
    async fn test_default_and_custom_user_agent() {
        let server = MockServer::start();
        let default_ua = server.mock(|when, then| {
            when.method(GET)
                .path("/default")
                .header("user-agent", crate::config::DEFAULT_USER_AGENT);
            then.status(200);
        });
        let custom_ua = server.mock(|when, then| {
            when.method(GET)
                .path("/custom")
                .header("user-agent", "custom/1.0");
            then.status(200);
        });

        test_client()
            .get(&server.url("/default"))
            .send()
            .await
            .unwrap();
        HttpClientBuilder::new()
            .allow_insecure_http()
            .user_agent("custom/1.0")
            .build()
            .unwrap()
            .get(&server.url("/custom"))
            .send()
            .await
            .unwrap();

        default_ua.assert();
        custom_ua.assert();
    }

    #[tokio::test]
    async fn test_non_2xx_returns_http_status_error() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/error");
            then.status(404)
                .header("content-type", "application/json")
                .body(r#"{"error": "not found"}"#);
        });

        let result: Result<serde_json::Value, _> = test_client()
            .get(&server.url("/error"))
            .send()
            .await
            .unwrap()
            .json()
            .await;
        match result {
            Err(HttpError::HttpStatus {
                status,
                body_preview,
                content_type,
            }) => {
                assert_eq!(status, http::StatusCode::NOT_FOUND);
                assert!(body_preview.contains("not found"));
                assert_eq!(content_type, Some("application/json".to_owned()));
            }
            other => panic!("Expected HttpStatus error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_for_status_keeps_success() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/text");
            then.status(200).body("hello world");
        });

        let text = test_client()
            .get(&server.url("/text"))
            .send()
            .await
            .unwrap()
            .error_for_status()
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(text, "hello world");
    }

    #[tokio::test]
    async fn test_invalid_header_is_deferred_to_send() {
        let result = test_client()
            .get("http://localhost/unused")
            .header("bad header", "value")
            .header("x-ok", "value")
            .send()
            .await;
        assert!(matches!(result, Err(HttpError::InvalidHeaderName(_))));
    }

    #[tokio::test]
    async fn test_concurrent_requests() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/concurrent");
            then.status(200).body("ok");
        });

        let client = test_client();
        let url = server.url("/concurrent");

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let client = client.clone();
                let url = url.clone();
                tokio::spawn(async move { client.get(&url).send().await })
            })
            .collect();

        for handle in handles {
            let resp = handle.await.unwrap().unwrap();
            assert_eq!(resp.status(), http::StatusCode::OK);
        }
    }

    #[test]
    fn test_http_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpClient>();
    }

    #[tokio::test]
    async fn test_resources_not_installed() {
        let client = test_client();
        assert!(!client.has_resources());
        assert!(matches!(
            client.resources(),
            Err(HttpError::FeatureNotInstalled("resources"))
        ));
    }

    #[tokio::test]
    async fn test_resources_installed() {
        let client = HttpClientBuilder::new()
            .allow_insecure_http()
            .with_resources(ResourcesConfig::new("http://localhost:8080/api"))
            .build()
            .unwrap();
        assert!(client.has_resources());
        assert_eq!(
            client.resources().unwrap().config().base_url,
            "http://localhost:8080/api"
        );
    }

    #[test]
    fn test_map_buffer_error_passes_through_http_error() {
        let boxed: tower::BoxError =
            Box::new(HttpError::Timeout(std::time::Duration::from_secs(10)));
        assert!(matches!(map_buffer_error(boxed), HttpError::Timeout(_)));
    }

    #[test]
    fn test_map_buffer_error_returns_service_closed_for_unknown_error() {
        let other: tower::BoxError = Box::new(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "buffer worker died",
        ));
        assert!(matches!(map_buffer_error(other), HttpError::ServiceClosed));
    }

    #[tokio::test]
    async fn test_url_scheme_http_rejected_with_tls_only() {
        let client = HttpClientBuilder::new().build().unwrap();

        match client.get("http://example.com/test").send().await {
            Err(HttpError::InvalidScheme { scheme, reason }) => {
                assert_eq!(scheme, "http");
                assert!(reason.contains("TlsOnly"), "unexpected reason: {reason}");
            }
            other => panic!("Expected InvalidScheme error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_url_scheme_invalid_rejected() {
        let result = test_client()
            .get("ftp://files.example.com/file.txt")
            .send()
            .await;
        assert!(matches!(
            result,
            Err(HttpError::InvalidScheme { ref scheme, .. }) if scheme == "ftp"
        ));
    }

    #[tokio::test]
    async fn test_relative_url_rejected() {
        let result = test_client().get("/items/1").send().await;
        assert!(matches!(
            result,
            Err(HttpError::InvalidUri {
                kind: crate::error::InvalidUriKind::MissingAuthority,
                ..
            })
        ));
    }
}
