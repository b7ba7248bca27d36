use modkit_resources::ResourcesConfig;
use std::time::Duration;

/// Default User-Agent string for HTTP requests
pub const DEFAULT_USER_AGENT: &str = concat!("modkit-http/", env!("CARGO_PKG_VERSION"));

/// Transport security configuration
///
/// Controls whether the client enforces TLS or allows insecure HTTP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportSecurity {
    /// Require TLS for all connections (HTTPS only) - default and recommended
    #[default]
    TlsOnly,
    /// Allow insecure HTTP connections (for testing with mock servers only)
    ///
    /// **WARNING**: Never use in production as it exposes traffic to interception.
    AllowInsecureHttp,
}

/// Overall HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout (default: 30 seconds)
    pub request_timeout: Duration,

    /// Maximum response body size in bytes (default: 10 MB)
    pub max_body_size: usize,

    /// User-Agent header value (default: [`DEFAULT_USER_AGENT`])
    pub user_agent: String,

    /// Transport security mode (default: `TlsOnly`)
    pub transport: TransportSecurity,

    /// Wrap every request in an `outgoing_http` tracing span (default: true)
    ///
    /// The span carries method, URL, status and, for resource requests, the
    /// `url.template` field.
    pub request_spans: bool,

    /// Buffer capacity for concurrent request handling (default: 1024)
    ///
    /// Maximum number of requests queued in front of the shared service.
    pub buffer_capacity: usize,

    /// Resources feature (default: not installed)
    ///
    /// When `None`, [`HttpClient::resources`](crate::HttpClient::resources)
    /// fails with [`HttpError::FeatureNotInstalled`](crate::HttpError::FeatureNotInstalled).
    pub resources: Option<ResourcesConfig>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_body_size: 10 * 1024 * 1024, // 10 MB
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            transport: TransportSecurity::TlsOnly,
            request_spans: true,
            buffer_capacity: 1024,
            resources: None,
        }
    }
}

impl HttpClientConfig {
    /// Configuration without request spans, for clients where tracing is
    /// handled elsewhere
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            request_spans: false,
            ..Default::default()
        }
    }

    /// Configuration for tests against local mock servers
    ///
    /// Allows plain HTTP and uses a short timeout.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            transport: TransportSecurity::AllowInsecureHttp,
            ..Default::default()
        }
    }

    /// Same configuration with the resources feature installed
    #[must_use]
    pub fn with_resources(mut self, resources: ResourcesConfig) -> Self {
        self.resources = Some(resources);
        self
    }
}
