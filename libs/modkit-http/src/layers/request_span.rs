use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Full;
use modkit_resources::UrlTemplate;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{Instrument, Level, field};

/// Tower layer that opens an `outgoing_http` span for every request
///
/// Span fields:
/// - `http.method`, `http.url` (query string stripped)
/// - `url.template`: the [`UrlTemplate`] found in the request extensions, so
///   requests for the same resource share one low-cardinality route label
/// - `http.status_code` and `error`, recorded on completion
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestSpanLayer;

impl RequestSpanLayer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for RequestSpanLayer {
    type Service = RequestSpanService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestSpanService { inner }
    }
}

#[derive(Clone, Debug)]
pub struct RequestSpanService<S> {
    inner: S,
}

impl<S, ResBody> Service<Request<Full<Bytes>>> for RequestSpanService<S>
where
    S: Service<Request<Full<Bytes>>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: std::fmt::Display + Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Full<Bytes>>) -> Self::Future {
        let uri = req.uri();
        let url = format!(
            "{}://{}{}",
            uri.scheme_str().unwrap_or("https"),
            uri.authority().map_or("", http::uri::Authority::as_str),
            uri.path()
        );

        let span = tracing::span!(
            Level::INFO, "outgoing_http",
            http.method = %req.method(),
            http.url = %url,
            url.template = field::Empty,
            http.status_code = field::Empty,
            error = field::Empty,
        );
        if let Some(template) = req.extensions().get::<UrlTemplate>() {
            span.record("url.template", field::display(template));
        }

        // Call the instance that was poll_ready'd, keep a fresh clone for the next cycle
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let result = inner.call(req).instrument(span.clone()).await;

            match &result {
                Ok(response) => {
                    let status = response.status();
                    span.record("http.status_code", status.as_u16());
                    if status.is_client_error() || status.is_server_error() {
                        span.record("error", true);
                    }
                    span.in_scope(|| tracing::debug!(status = status.as_u16(), "request completed"));
                }
                Err(e) => {
                    span.record("error", true);
                    span.in_scope(|| tracing::debug!(error = %e, "request failed"));
                }
            }

            result
        })
    }
}
