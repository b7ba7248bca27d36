use crate::client::{BufferedService, map_buffer_error, try_acquire_buffer_slot};
use crate::config::TransportSecurity;
use crate::error::{HttpError, InvalidUriKind};
use crate::response::{HttpResponse, ResponseBody};
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{Extensions, Request, Response};
use http_body_util::Full;
use modkit_resources::UrlTemplate;
use serde::Serialize;
use tower::Service;

/// Body type for the request builder
#[derive(Clone, Debug)]
enum BodyKind {
    Empty,
    Bytes(Bytes),
    /// Serialized JSON, sent with `application/json` unless overridden
    Json(Bytes),
    /// Serialized form, sent with `application/x-www-form-urlencoded` unless overridden
    Form(Bytes),
}

/// HTTP request builder with fluent API
///
/// Created by [`HttpClient::get`](crate::HttpClient::get) and the other verb
/// helpers, or by [`ResourcesClient`](crate::ResourcesClient) for typed
/// resources. Errors raised while building are deferred to
/// [`send()`](RequestBuilder::send).
///
/// # Example
///
/// ```ignore
/// let resp = client
///     .post("https://api.example.com/users")
///     .header("x-request-id", "123")
///     .json(&NewUser { name: "Alice" })?
///     .send()
///     .await?;
/// ```
#[must_use = "RequestBuilder does nothing until .send() is called"]
pub struct RequestBuilder {
    service: BufferedService,
    max_body_size: usize,
    method: http::Method,
    url: String,
    user_agent: HeaderValue,
    headers: Vec<(HeaderName, HeaderValue)>,
    extensions: Extensions,
    body: BodyKind,
    /// Error captured during building (deferred to `send()`)
    error: Option<HttpError>,
    transport_security: TransportSecurity,
}

impl RequestBuilder {
    pub(crate) fn new(
        service: BufferedService,
        max_body_size: usize,
        method: http::Method,
        url: String,
        user_agent: HeaderValue,
        transport_security: TransportSecurity,
    ) -> Self {
        Self {
            service,
            max_body_size,
            method,
            url,
            user_agent,
            headers: Vec::new(),
            extensions: Extensions::new(),
            body: BodyKind::Empty,
            error: None,
            transport_security,
        }
    }

    /// Record an error to be returned by `send()`. The first error wins.
    pub(crate) fn with_error(mut self, error: HttpError) -> Self {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self
    }

    /// Add a single header to the request
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.error.is_some() {
            return self;
        }

        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => self.headers.push((name, value)),
            (Err(e), _) => self.error = Some(HttpError::InvalidHeaderName(e)),
            (_, Err(e)) => self.error = Some(HttpError::InvalidHeaderValue(e)),
        }
        self
    }

    /// Add multiple headers to the request
    ///
    /// Stops at the first invalid name or value.
    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        for (name, value) in headers {
            self = self.header(&name, &value);
            if self.error.is_some() {
                break;
            }
        }
        self
    }

    /// Attach a typed value to the request's [`http::Extensions`].
    ///
    /// Extensions travel through the middleware stack and are visible to
    /// every layer. A value of the same type replaces the previous one.
    pub fn extension<T>(mut self, value: T) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.extensions.insert(value);
        self
    }

    /// The [`UrlTemplate`] attached to this request, if any
    #[must_use]
    pub fn url_template(&self) -> Option<&UrlTemplate> {
        self.extensions.get::<UrlTemplate>()
    }

    /// Set request body as JSON
    ///
    /// Content-Type defaults to `application/json`.
    ///
    /// # Errors
    ///
    /// Returns a deferred builder error, or [`HttpError::Json`] if
    /// serialization fails.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        self.body = BodyKind::Json(Bytes::from(serde_json::to_vec(body)?));
        Ok(self)
    }

    /// Set request body as form URL-encoded
    ///
    /// Content-Type defaults to `application/x-www-form-urlencoded`.
    ///
    /// # Errors
    ///
    /// Returns a deferred builder error, or [`HttpError::FormEncode`] if
    /// encoding fails.
    pub fn form(mut self, fields: &[(&str, &str)]) -> Result<Self, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        self.body = BodyKind::Form(Bytes::from(serde_urlencoded::to_string(fields)?));
        Ok(self)
    }

    /// Set request body as raw bytes
    pub fn body_bytes(mut self, body: Bytes) -> Self {
        self.body = BodyKind::Bytes(body);
        self
    }

    /// Set request body as a string
    pub fn body_string(mut self, body: String) -> Self {
        self.body = BodyKind::Bytes(Bytes::from(body));
        self
    }

    /// Parse the URL and check its scheme against the transport security mode.
    fn validate_url(&self) -> Result<http::Uri, HttpError> {
        let uri: http::Uri =
            self.url
                .parse()
                .map_err(|e: http::uri::InvalidUri| HttpError::InvalidUri {
                    url: self.url.clone(),
                    kind: InvalidUriKind::ParseError,
                    reason: e.to_string(),
                })?;

        if uri.authority().is_none() {
            return Err(HttpError::InvalidUri {
                url: self.url.clone(),
                kind: InvalidUriKind::MissingAuthority,
                reason: "missing host/authority".to_owned(),
            });
        }

        match (uri.scheme_str(), self.transport_security) {
            (Some("https"), _) | (Some("http"), TransportSecurity::AllowInsecureHttp) => Ok(uri),
            (Some("http"), TransportSecurity::TlsOnly) => Err(HttpError::InvalidScheme {
                scheme: "http".to_owned(),
                reason: "HTTPS required (transport security is TlsOnly)".to_owned(),
            }),
            (Some(scheme), _) => Err(HttpError::InvalidScheme {
                scheme: scheme.to_owned(),
                reason: "only http:// and https:// schemes are supported".to_owned(),
            }),
            (None, _) => Err(HttpError::InvalidUri {
                url: self.url.clone(),
                kind: InvalidUriKind::MissingScheme,
                reason: "missing scheme".to_owned(),
            }),
        }
    }

    /// Send the request and return the response
    ///
    /// A [`UrlTemplate`] attached to the request is copied onto the response
    /// (see [`HttpResponse::url_template`]).
    ///
    /// # Errors
    ///
    /// Returns `HttpError` if:
    /// - building failed earlier (invalid header, unresolvable resource, ...)
    /// - the URL is invalid or its scheme is not allowed
    /// - the request buffer is full (`Overloaded`)
    /// - the transport fails or the request times out
    pub async fn send(mut self) -> Result<HttpResponse, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        let uri = self.validate_url()?;
        let mut builder = Request::builder().method(self.method).uri(uri);

        let has_header = |name: &HeaderName| self.headers.iter().any(|(n, _)| n == name);
        if !has_header(&http::header::USER_AGENT) {
            builder = builder.header(http::header::USER_AGENT, self.user_agent.clone());
        }
        if !has_header(&http::header::CONTENT_TYPE) {
            match &self.body {
                BodyKind::Json(_) => {
                    builder = builder.header(http::header::CONTENT_TYPE, "application/json");
                }
                BodyKind::Form(_) => {
                    builder = builder.header(
                        http::header::CONTENT_TYPE,
                        "application/x-www-form-urlencoded",
                    );
                }
                BodyKind::Empty | BodyKind::Bytes(_) => {}
            }
        }
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }

        let body = match self.body {
            BodyKind::Empty => Bytes::new(),
            BodyKind::Bytes(b) | BodyKind::Json(b) | BodyKind::Form(b) => b,
        };

        let template = self.extensions.get::<UrlTemplate>().cloned();
        let mut request = builder.body(Full::new(body))?;
        *request.extensions_mut() = self.extensions;

        try_acquire_buffer_slot(&mut self.service).await?;

        let mut inner: Response<ResponseBody> =
            self.service.call(request).await.map_err(map_buffer_error)?;

        if let Some(template) = template {
            inner.extensions_mut().insert(template);
        }

        Ok(HttpResponse {
            inner,
            max_body_size: self.max_body_size,
        })
    }
}
