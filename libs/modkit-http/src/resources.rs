//! Typed resource requests.
//!
//! A [`ResourcesClient`] turns a [`Resource`] value into a request: the
//! resource's href is resolved against the configured base URL and its
//! [`UrlTemplate`] is attached to the request extensions, where the request
//! span (and any other layer) can read it.

use crate::client::HttpClient;
use crate::error::HttpError;
use crate::request::RequestBuilder;
use http::Method;
use modkit_resources::{
    Parameters, Resource, ResourceError, ResourcesConfig, UrlTemplate, build_url_template,
    resolve,
};
use std::sync::Arc;

/// Resource-aware view of an [`HttpClient`].
///
/// Obtained from [`HttpClient::resources`]; shares the client's middleware
/// stack and is as cheap to clone.
///
/// ```ignore
/// #[derive(Serialize, Resource)]
/// #[resource("/items/{id}")]
/// struct Item {
///     id: u64,
///     expand: Option<String>,
/// }
///
/// let resources = client.resources()?;
/// let item: ItemDto = resources
///     .get(&Item { id: 42, expand: None })
///     .send()
///     .await?
///     .json()
///     .await?;
/// ```
#[derive(Clone)]
pub struct ResourcesClient {
    client: HttpClient,
    config: Arc<ResourcesConfig>,
}

impl ResourcesClient {
    pub(crate) fn new(client: HttpClient, config: Arc<ResourcesConfig>) -> Self {
        Self { client, config }
    }

    #[must_use]
    pub fn config(&self) -> &ResourcesConfig {
        &self.config
    }

    /// The underlying client, for requests that are not resources
    #[must_use]
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Absolute URL of `resource` under the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the resource's descriptor is invalid or
    /// its values cannot fill the path.
    pub fn href<R: Resource>(&self, resource: &R) -> Result<String, ResourceError> {
        self.prepare(resource).map(|(url, _)| url)
    }

    /// Create a request builder for `resource` with an arbitrary method.
    ///
    /// Resolution failures do not panic or return early; they are deferred as
    /// [`HttpError::Resource`] like other builder errors. The error comes out
    /// of the first fallible builder step: `send()`, or
    /// [`json()`](RequestBuilder::json) / [`form()`](RequestBuilder::form)
    /// when a body is set.
    pub fn request<R: Resource>(&self, method: Method, resource: &R) -> RequestBuilder {
        match self.prepare(resource) {
            Ok((url, template)) => {
                let builder = self.client.request(method, &url);
                if self.config.attach_url_template {
                    builder.extension(template)
                } else {
                    builder
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "failed to resolve resource");
                self.client
                    .request(method, &self.config.base_url)
                    .with_error(HttpError::Resource(e))
            }
        }
    }

    pub fn get<R: Resource>(&self, resource: &R) -> RequestBuilder {
        self.request(Method::GET, resource)
    }

    pub fn post<R: Resource>(&self, resource: &R) -> RequestBuilder {
        self.request(Method::POST, resource)
    }

    pub fn put<R: Resource>(&self, resource: &R) -> RequestBuilder {
        self.request(Method::PUT, resource)
    }

    pub fn patch<R: Resource>(&self, resource: &R) -> RequestBuilder {
        self.request(Method::PATCH, resource)
    }

    pub fn delete<R: Resource>(&self, resource: &R) -> RequestBuilder {
        self.request(Method::DELETE, resource)
    }

    pub fn head<R: Resource>(&self, resource: &R) -> RequestBuilder {
        self.request(Method::HEAD, resource)
    }

    pub fn options<R: Resource>(&self, resource: &R) -> RequestBuilder {
        self.request(Method::OPTIONS, resource)
    }

    /// Resolve the absolute URL and template from a single descriptor
    fn prepare<R: Resource>(&self, resource: &R) -> Result<(String, UrlTemplate), ResourceError> {
        let descriptor = R::descriptor()?;
        let href = resolve(&descriptor, &Parameters::encode(resource)?)?;
        let template = build_url_template(&descriptor);
        tracing::trace!(template = %template, href = %href, "prepared resource request");
        Ok((self.config.url_for(&href), template))
    }
}
