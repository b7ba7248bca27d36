use crate::config::{HttpClientConfig, TransportSecurity};
use crate::error::{HttpError, InvalidUriKind};
use crate::layers::RequestSpanLayer;
use crate::response::ResponseBody;
use bytes::Bytes;
use http::Response;
use http::header::HeaderValue;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use modkit_resources::ResourcesConfig;
use std::sync::Arc;
use std::time::Duration;
use tower::buffer::Buffer;
use tower::timeout::TimeoutLayer;
use tower::{ServiceBuilder, ServiceExt};

/// Builder for constructing an [`HttpClient`](crate::HttpClient) with a
/// layered tower middleware stack.
///
/// Optional features are installed here; using a feature the builder did not
/// install fails with [`HttpError::FeatureNotInstalled`].
///
/// ```ignore
/// let client = HttpClient::builder()
///     .timeout(Duration::from_secs(10))
///     .with_resources(ResourcesConfig::new("https://api.example.com/v1"))
///     .build()?;
///
/// let resources = client.resources()?;
/// ```
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self { config }
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the maximum response body size
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Set transport security mode
    ///
    /// Use `TransportSecurity::AllowInsecureHttp` only for testing with mock servers.
    #[must_use]
    pub fn transport(mut self, transport: TransportSecurity) -> Self {
        self.config.transport = transport;
        self
    }

    /// Allow insecure HTTP connections (for testing only)
    ///
    /// Only available in debug builds or with the `allow-insecure-http` feature.
    #[must_use]
    #[cfg(any(debug_assertions, feature = "allow-insecure-http"))]
    pub fn allow_insecure_http(mut self) -> Self {
        tracing::warn!(
            target: "modkit_http::security",
            "allow_insecure_http() called - HTTP traffic will NOT be encrypted"
        );
        self.config.transport = TransportSecurity::AllowInsecureHttp;
        self
    }

    /// Enable or disable the per-request tracing span
    #[must_use]
    pub fn request_spans(mut self, enabled: bool) -> Self {
        self.config.request_spans = enabled;
        self
    }

    /// Set the buffer capacity for concurrent request handling
    ///
    /// A capacity of 0 is clamped to 1.
    #[must_use]
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        // tower::Buffer panics with capacity=0
        self.config.buffer_capacity = capacity.max(1);
        self
    }

    /// Install the resources feature.
    ///
    /// Enables [`HttpClient::resources`](crate::HttpClient::resources). The
    /// base URL is validated by [`build`](Self::build).
    #[must_use]
    pub fn with_resources(mut self, resources: ResourcesConfig) -> Self {
        self.config.resources = Some(resources);
        self
    }

    /// Build the HTTP client with all configured layers
    ///
    /// # Errors
    /// Returns an error if:
    /// - TLS initialization fails
    /// - the user agent is not a valid header value
    /// - the resources base URL is not an absolute URL allowed by the
    ///   transport security mode, or has a query or fragment
    pub fn build(self) -> Result<crate::HttpClient, HttpError> {
        if self.config.transport == TransportSecurity::AllowInsecureHttp {
            tracing::warn!(
                "insecure HTTP enabled (TransportSecurity::AllowInsecureHttp); \
                 use only for testing with mock servers"
            );
        }

        let user_agent = HeaderValue::from_str(&self.config.user_agent)?;

        let resources = match self.config.resources {
            Some(resources) => {
                validate_base_url(&resources.base_url, self.config.transport)?;
                tracing::debug!(
                    base_url = %resources.base_url,
                    attach_url_template = resources.attach_url_template,
                    "resources feature installed"
                );
                Some(Arc::new(resources))
            }
            None => None,
        };

        let timeout = self.config.request_timeout;
        let https = build_https_connector(self.config.transport)?;
        let hyper_client = Client::builder(TokioExecutor::new()).build::<_, Full<Bytes>>(https);

        // Request flow (outer -> inner):
        //   Buffer -> RequestSpan? -> ErrorMapping -> Timeout -> hyper_client
        //
        // send() returns Ok for every HTTP status; only transport, TLS and
        // timeout failures are errors.
        let service = ServiceBuilder::new()
            .layer(TimeoutLayer::new(timeout))
            .service(hyper_client)
            .map_response(box_response)
            .map_err(move |e: tower::BoxError| map_tower_error(e, timeout));

        let mut boxed_service = service.boxed_clone();

        if self.config.request_spans {
            boxed_service = ServiceBuilder::new()
                .layer(RequestSpanLayer::new())
                .service(boxed_service)
                .boxed_clone();
        }

        let buffered_service: crate::client::BufferedService =
            Buffer::new(boxed_service, self.config.buffer_capacity.max(1));

        Ok(crate::HttpClient {
            service: buffered_service,
            max_body_size: self.config.max_body_size,
            transport_security: self.config.transport,
            user_agent,
            resources,
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Check that `base_url` is absolute, ends in a path and uses a scheme the
/// client may send to
fn validate_base_url(base_url: &str, transport: TransportSecurity) -> Result<(), HttpError> {
    let uri: http::Uri = base_url
        .parse()
        .map_err(|e: http::uri::InvalidUri| HttpError::InvalidUri {
            url: base_url.to_owned(),
            kind: InvalidUriKind::ParseError,
            reason: e.to_string(),
        })?;

    let invalid = |kind| HttpError::InvalidUri {
        url: base_url.to_owned(),
        kind,
        reason: "resources base URL must be absolute".to_owned(),
    };
    let Some(scheme) = uri.scheme_str() else {
        return Err(invalid(InvalidUriKind::MissingScheme));
    };
    if uri.authority().is_none() {
        return Err(invalid(InvalidUriKind::MissingAuthority));
    }
    // Hrefs are appended to the base, so it must end in a path. `http::Uri`
    // drops a fragment while parsing, hence the raw check.
    if uri.query().is_some() || base_url.contains('#') {
        return Err(HttpError::InvalidUri {
            url: base_url.to_owned(),
            kind: InvalidUriKind::QueryOrFragment,
            reason: "resources base URL must not have a query or fragment".to_owned(),
        });
    }

    match (scheme, transport) {
        ("https", _) | ("http", TransportSecurity::AllowInsecureHttp) => Ok(()),
        _ => Err(HttpError::InvalidScheme {
            scheme: scheme.to_owned(),
            reason: "resources base URL scheme is not allowed by transport security".to_owned(),
        }),
    }
}

/// Map tower errors to `HttpError` with actual timeout duration
fn map_tower_error(err: tower::BoxError, timeout: Duration) -> HttpError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return HttpError::Timeout(timeout);
    }

    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(other) => match other.downcast::<hyper_util::client::legacy::Error>() {
            Ok(hyper_err) => HttpError::from(*hyper_err),
            Err(other) => HttpError::Transport(other),
        },
    }
}

fn box_response<B>(response: Response<B>) -> Response<ResponseBody>
where
    B: hyper::body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, body.map_err(Into::into).boxed())
}

/// HTTPS connector using the webpki root store.
///
/// Uses the process-wide rustls crypto provider when one is installed,
/// otherwise aws-lc-rs. ALPN advertises both h2 and http/1.1.
fn build_https_connector(
    transport: TransportSecurity,
) -> Result<HttpsConnector<HttpConnector>, HttpError> {
    let provider = rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()));

    let builder = hyper_rustls::HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(provider)
        .map_err(|e| HttpError::Tls(Box::new(e)))?;

    Ok(match transport {
        TransportSecurity::AllowInsecureHttp => {
            builder.https_or_http().enable_all_versions().build()
        }
        TransportSecurity::TlsOnly => builder.https_only().enable_all_versions().build(),
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::DEFAULT_USER_AGENT;

    #[test]
    fn test_builder_default() {
        let builder = HttpClientBuilder::new();
        assert_eq!(builder.config.request_timeout, Duration::from_secs(30));
        assert_eq!(builder.config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(builder.config.buffer_capacity, 1024);
        assert!(builder.config.resources.is_none());
    }

    #[test]
    fn test_builder_setters() {
        let builder = HttpClientBuilder::new()
            .timeout(Duration::from_secs(60))
            .user_agent("custom/1.0")
            .max_body_size(1024)
            .request_spans(false)
            .buffer_capacity(0);

        assert_eq!(builder.config.request_timeout, Duration::from_secs(60));
        assert_eq!(builder.config.user_agent, "custom/1.0");
        assert_eq!(builder.config.max_body_size, 1024);
        assert!(!builder.config.request_spans);
        assert_eq!(builder.config.buffer_capacity, 1);
    }

    #[test]
    fn test_builder_transport_security() {
        let builder = HttpClientBuilder::new().allow_insecure_http();
        assert_eq!(
            builder.config.transport,
            TransportSecurity::AllowInsecureHttp
        );
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("https://api.example.com/v1", TransportSecurity::TlsOnly).is_ok());
        assert!(
            validate_base_url("http://localhost:8080", TransportSecurity::AllowInsecureHttp)
                .is_ok()
        );

        assert!(matches!(
            validate_base_url("http://localhost:8080", TransportSecurity::TlsOnly),
            Err(HttpError::InvalidScheme { ref scheme, .. }) if scheme == "http"
        ));
        assert!(matches!(
            validate_base_url("/v1", TransportSecurity::TlsOnly),
            Err(HttpError::InvalidUri {
                kind: InvalidUriKind::MissingScheme,
                ..
            })
        ));
        assert!(matches!(
            validate_base_url("not a url", TransportSecurity::TlsOnly),
            Err(HttpError::InvalidUri {
                kind: InvalidUriKind::ParseError,
                ..
            })
        ));
    }

    #[test]
    fn test_validate_base_url_rejects_query_and_fragment() {
        for base in [
            "https://api.example.com/v1?key=abc",
            "https://api.example.com/v1#top",
        ] {
            assert!(
                matches!(
                    validate_base_url(base, TransportSecurity::TlsOnly),
                    Err(HttpError::InvalidUri {
                        kind: InvalidUriKind::QueryOrFragment,
                        ref url,
                        ..
                    }) if url == base
                ),
                "{base} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_build_rejects_base_url_with_query() {
        let result = HttpClientBuilder::new()
            .with_resources(ResourcesConfig::new("https://api.example.com/v1?key=abc"))
            .build();
        assert!(matches!(
            result,
            Err(HttpError::InvalidUri {
                kind: InvalidUriKind::QueryOrFragment,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_build_rejects_invalid_resources_base_url() {
        let result = HttpClientBuilder::new()
            .with_resources(ResourcesConfig::new("http://api.example.com"))
            .build();
        assert!(matches!(result, Err(HttpError::InvalidScheme { .. })));
    }

    #[tokio::test]
    async fn test_build_rejects_invalid_user_agent() {
        let result = HttpClientBuilder::new().user_agent("bad\nagent").build();
        assert!(matches!(result, Err(HttpError::InvalidHeaderValue(_))));
    }
}
