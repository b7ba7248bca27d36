use crate::error::HttpError;
use bytes::{Bytes, BytesMut};
use http::{Extensions, HeaderMap, Response, StatusCode};
use http_body_util::BodyExt;
use modkit_resources::UrlTemplate;
use serde::de::DeserializeOwned;

/// Maximum number of body bytes quoted in [`HttpError::HttpStatus`]
const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;

/// Type-erased response body
pub type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

/// HTTP response wrapper with body-reading helpers
///
/// - `resp.error_for_status()?` checks the status without reading the body
/// - `resp.bytes().await?` reads raw bytes
/// - `resp.json::<T>().await?` parses JSON after a status check
///
/// All body reads enforce the client's `max_body_size`.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
}

impl HttpResponse {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Response extensions, including values copied from the request
    #[must_use]
    pub fn extensions(&self) -> &Extensions {
        self.inner.extensions()
    }

    /// URL template of the resource this response was requested for.
    ///
    /// `None` for plain URL requests, or when the resources feature is
    /// configured not to attach templates.
    #[must_use]
    pub fn url_template(&self) -> Option<&UrlTemplate> {
        self.inner.extensions().get::<UrlTemplate>()
    }

    /// Consume the wrapper and return the inner response
    #[must_use]
    pub fn into_inner(self) -> Response<ResponseBody> {
        self.inner
    }

    /// Fail with [`HttpError::HttpStatus`] for non-2xx responses.
    ///
    /// Does not read the body, so the error carries an empty preview.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::HttpStatus` if the response status is not 2xx.
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if self.inner.status().is_success() {
            return Ok(self);
        }

        Err(HttpError::HttpStatus {
            status: self.inner.status(),
            body_preview: String::new(),
            content_type: content_type(self.inner.headers()),
        })
    }

    /// Read the body as bytes without a status check
    ///
    /// # Errors
    /// Returns `HttpError::BodyTooLarge` if body exceeds limit.
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        read_limited(self.inner, self.max_body_size).await
    }

    /// Read the body as bytes, failing on non-2xx status
    ///
    /// # Errors
    /// Returns `HttpError::HttpStatus` (with a body preview) if status is not
    /// 2xx, or `HttpError::BodyTooLarge` if the body exceeds the limit.
    pub async fn checked_bytes(self) -> Result<Bytes, HttpError> {
        read_checked(self.inner, self.max_body_size).await
    }

    /// Parse the body as JSON, failing on non-2xx status
    ///
    /// # Errors
    /// Same as [`checked_bytes`](Self::checked_bytes), plus `HttpError::Json`
    /// if parsing fails.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let body = read_checked(self.inner, self.max_body_size).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Read the body as UTF-8 text (lossy), failing on non-2xx status
    ///
    /// # Errors
    /// Same as [`checked_bytes`](Self::checked_bytes).
    pub async fn text(self) -> Result<String, HttpError> {
        let body = read_checked(self.inner, self.max_body_size).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    #[must_use]
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

async fn read_checked(
    response: Response<ResponseBody>,
    max_body_size: usize,
) -> Result<Bytes, HttpError> {
    let status = response.status();
    if status.is_success() {
        return read_limited(response, max_body_size).await;
    }

    let content_type = content_type(response.headers());
    // An oversized error body must not hide the status
    let body_preview =
        match read_limited(response, max_body_size.min(ERROR_BODY_PREVIEW_LIMIT)).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(HttpError::BodyTooLarge { .. }) => "<body too large for preview>".to_owned(),
            Err(e) => return Err(e),
        };

    Err(HttpError::HttpStatus {
        status,
        body_preview,
        content_type,
    })
}

async fn read_limited(response: Response<ResponseBody>, limit: usize) -> Result<Bytes, HttpError> {
    let mut body = response.into_body();
    let mut collected = BytesMut::new();

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(HttpError::Transport)?;
        if let Some(data) = frame.data_ref() {
            let actual = collected.len() + data.len();
            if actual > limit {
                return Err(HttpError::BodyTooLarge { limit, actual });
            }
            collected.extend_from_slice(data);
        }
    }

    Ok(collected.freeze())
}
